//! WMTS tile URL templates.
//!
//! Produces templates of the form
//! `{base}/{layer}/default/{YYYY-MM-DD}/{tile_matrix_set}/{z}/{y}/{x}.png`.
//! The `{z}`, `{y}` and `{x}` placeholders are left for the map engine to
//! fill in. Whether imagery actually exists for the date is never checked
//! here; a missing day simply shows up as broken tiles.

use chrono::NaiveDate;
use hotspot_map_imagery_models::LayerDescriptor;

/// Builds tile URL templates against a fixed WMTS base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileUrlBuilder {
    base: String,
}

impl TileUrlBuilder {
    /// Creates a builder for `base`. A trailing slash is ignored.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// Builds the tile template for `descriptor` as of `date`.
    #[must_use]
    pub fn build(&self, descriptor: &LayerDescriptor, date: NaiveDate) -> String {
        format!(
            "{}/{}/default/{}/{}/{{z}}/{{y}}/{{x}}.{}",
            self.base,
            descriptor.source_name,
            date.format("%Y-%m-%d"),
            descriptor.tile_matrix_set,
            descriptor.format,
        )
    }
}

impl Default for TileUrlBuilder {
    fn default() -> Self {
        Self::new(crate::GIBS_WMTS_BASE)
    }
}
