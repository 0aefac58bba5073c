#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Satellite imagery layers for the hotspot map.
//!
//! Near-real-time imagery is published with a delay, so every layer is
//! built for a specific calendar date. This crate keeps a set of named
//! layers consistent with the session's current date:
//!
//! - [`tile_url`] turns a [`LayerDescriptor`] and a date into a WMTS tile
//!   template URL.
//! - [`registry::LayerRegistry`] owns one tile source per layer, rebuilds
//!   every source when the date changes, and attaches/detaches sources on
//!   the map without ever changing a layer's visibility as a side effect.
//!
//! The map engine itself is abstracted behind [`MapSurface`].

pub mod registry;
pub mod tile_url;

use chrono::{Days, NaiveDate};
use hotspot_map_imagery_models::{LayerDescriptor, LayerKey};
use thiserror::Error;

pub use registry::{LayerRegistry, LayerState, RebuildReport};
pub use tile_url::TileUrlBuilder;

/// Default number of days between "today" and the newest date that is
/// assumed to have published imagery.
pub const DEFAULT_IMAGERY_LAG_DAYS: u32 = 2;

/// Base URL of the NASA GIBS WMTS endpoint (Web Mercator, "best" product).
pub const GIBS_WMTS_BASE: &str = "https://gibs.earthdata.nasa.gov/wmts/epsg3857/best";

/// The map engine primitives the registry needs.
///
/// Implementations own the actual tile layers; the registry only holds the
/// opaque [`MapSurface::TileSource`] handles they hand out.
pub trait MapSurface {
    /// Handle to a tile layer created by this surface.
    type TileSource;

    /// Creates (but does not attach) a tile source for `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns [`LayerBuildError`] if the engine rejects the layer.
    fn create_tile_source(
        &mut self,
        descriptor: &LayerDescriptor,
        url_template: &str,
    ) -> Result<Self::TileSource, LayerBuildError>;

    /// Adds the tile source to the map.
    fn attach(&mut self, source: &Self::TileSource);

    /// Removes the tile source from the map. Detaching a source that is not
    /// attached must be harmless.
    fn detach(&mut self, source: &Self::TileSource);
}

/// Failure to build the tile source of a single layer.
#[derive(Debug, Error)]
#[error("Failed to build tile source for layer '{key}': {message}")]
pub struct LayerBuildError {
    /// The layer whose source could not be built.
    pub key: LayerKey,
    /// Description of the failure.
    pub message: String,
}

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry was used before [`LayerRegistry::initialize`].
    #[error("Layer registry used before initialization")]
    Uninitialized,
}

/// Returns the newest date assumed to have published imagery.
///
/// Falls back to `today` if subtracting the lag would underflow the
/// calendar.
#[must_use]
pub fn default_imagery_date(today: NaiveDate, lag_days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(lag_days)))
        .unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_date_lags_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            default_imagery_date(today, 2),
            NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()
        );
        assert_eq!(default_imagery_date(today, 0), today);
    }
}
