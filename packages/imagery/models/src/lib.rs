#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Imagery layer descriptors for the hotspot map.
//!
//! A [`LayerDescriptor`] is the immutable, date-independent half of an
//! imagery layer: which WMTS layer to request, which tile matrix set it is
//! published in, and how it should be drawn. The date-dependent half (the
//! tile source built for a specific day) lives in `hotspot_map_imagery`.
//!
//! [`default_catalog`] returns the three NASA GIBS layers the dashboard
//! ships with: land surface temperature, night lights, and vegetation.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Key of the land surface temperature layer.
pub const TEMPERATURE: &str = "temperature";
/// Key of the night-lights layer.
pub const NIGHT_LIGHTS: &str = "night_lights";
/// Key of the vegetation index layer.
pub const VEGETATION: &str = "vegetation";

/// Identifier of an imagery layer (e.g. `"temperature"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerKey(String);

impl LayerKey {
    /// Creates a key from any string-like value.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for LayerKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Image format served by the tile endpoint.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TileFormat {
    /// PNG tiles (supports transparency).
    #[default]
    Png,
    /// JPEG tiles.
    Jpg,
}

/// Static description of an imagery layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// Unique key used to address the layer from the UI.
    pub key: LayerKey,
    /// Human-readable name shown in the layer switcher.
    pub title: String,
    /// WMTS layer name on the imagery server
    /// (e.g. `"MODIS_Terra_Land_Surface_Temp_Day"`).
    pub source_name: String,
    /// Tile matrix set identifier (e.g. `"GoogleMapsCompatible_Level7"`).
    pub tile_matrix_set: String,
    /// Highest zoom level the layer is published at.
    pub max_zoom: u8,
    /// Attribution text shown on the map.
    pub attribution: String,
    /// Layer opacity in `[0, 1]`.
    pub opacity: f32,
    /// Tile image format.
    #[serde(default)]
    pub format: TileFormat,
    /// Whether the layer is attached when the session starts.
    #[serde(default)]
    pub visible_by_default: bool,
}

impl LayerDescriptor {
    /// Returns the opacity clamped to `[0, 1]`.
    ///
    /// Descriptors loaded from user configuration are not validated, so
    /// consumers should read the opacity through this accessor.
    #[must_use]
    pub fn clamped_opacity(&self) -> f32 {
        self.opacity.clamp(0.0, 1.0)
    }
}

const GIBS_ATTRIBUTION: &str = "Imagery courtesy of NASA EOSDIS GIBS";

/// Returns the built-in imagery layers, in display order.
///
/// Temperature is the only layer visible by default.
#[must_use]
pub fn default_catalog() -> Vec<LayerDescriptor> {
    vec![
        LayerDescriptor {
            key: LayerKey::new(TEMPERATURE),
            title: "Land surface temperature".to_string(),
            source_name: "MODIS_Terra_Land_Surface_Temp_Day".to_string(),
            tile_matrix_set: "GoogleMapsCompatible_Level7".to_string(),
            max_zoom: 7,
            attribution: GIBS_ATTRIBUTION.to_string(),
            opacity: 0.6,
            format: TileFormat::Png,
            visible_by_default: true,
        },
        LayerDescriptor {
            key: LayerKey::new(NIGHT_LIGHTS),
            title: "Night lights".to_string(),
            source_name: "VIIRS_SNPP_DayNightBand_ENCC".to_string(),
            tile_matrix_set: "GoogleMapsCompatible_Level8".to_string(),
            max_zoom: 8,
            attribution: GIBS_ATTRIBUTION.to_string(),
            opacity: 0.7,
            format: TileFormat::Png,
            visible_by_default: false,
        },
        LayerDescriptor {
            key: LayerKey::new(VEGETATION),
            title: "Vegetation index (NDVI)".to_string(),
            source_name: "MODIS_Terra_NDVI_8Day".to_string(),
            tile_matrix_set: "GoogleMapsCompatible_Level9".to_string(),
            max_zoom: 9,
            attribution: GIBS_ATTRIBUTION.to_string(),
            opacity: 0.6,
            format: TileFormat::Png,
            visible_by_default: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn catalog_keys_are_unique() {
        let mut seen = BTreeSet::new();
        for layer in default_catalog() {
            assert!(seen.insert(layer.key.clone()), "Duplicate key {}", layer.key);
        }
    }

    #[test]
    fn only_temperature_is_visible_by_default() {
        let visible: Vec<LayerKey> = default_catalog()
            .into_iter()
            .filter(|l| l.visible_by_default)
            .map(|l| l.key)
            .collect();
        assert_eq!(visible, vec![LayerKey::new(TEMPERATURE)]);
    }

    #[test]
    fn clamps_out_of_range_opacity() {
        let mut layer = default_catalog().remove(0);
        layer.opacity = 1.7;
        assert!((layer.clamped_opacity() - 1.0).abs() < f32::EPSILON);
        layer.opacity = -0.2;
        assert!(layer.clamped_opacity().abs() < f32::EPSILON);
    }

    #[test]
    fn parses_descriptor_from_toml() {
        let layer: LayerDescriptor = toml::from_str(
            r#"
            key = "smoke"
            title = "Aerosol"
            source_name = "MODIS_Combined_Value_Added_AOD"
            tile_matrix_set = "GoogleMapsCompatible_Level6"
            max_zoom = 6
            attribution = "NASA"
            opacity = 0.5
            format = "jpg"
            "#,
        )
        .unwrap();
        assert_eq!(layer.key.as_str(), "smoke");
        assert_eq!(layer.format, TileFormat::Jpg);
        assert!(!layer.visible_by_default);
    }
}
