//! Dashboard configuration.
//!
//! Configuration is layered, lowest priority first:
//!
//! 1. `config/default.toml`, embedded at compile time;
//! 2. an optional user TOML file, merged key by key over the defaults;
//! 3. environment variables (`HOTSPOT_SCORING_URL`, `HOTSPOT_TILE_BASE`,
//!    `HOTSPOT_NOMINATIM_URL`, `HOTSPOT_IMAGERY_LAG_DAYS`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use hotspot_map_geocoder::SearchConfig;
use hotspot_map_imagery_models::{LayerDescriptor, default_catalog};
use hotspot_map_placement_models::{InvalidCoordinateError, LatLng};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_TOML: &str = include_str!("../config/default.toml");

/// Overrides the scoring service base URL.
pub const ENV_SCORING_URL: &str = "HOTSPOT_SCORING_URL";
/// Overrides the WMTS tile base URL.
pub const ENV_TILE_BASE: &str = "HOTSPOT_TILE_BASE";
/// Overrides the place search endpoint.
pub const ENV_NOMINATIM_URL: &str = "HOTSPOT_NOMINATIM_URL";
/// Overrides the imagery publication lag.
pub const ENV_IMAGERY_LAG_DAYS: &str = "HOTSPOT_IMAGERY_LAG_DAYS";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The user configuration file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A configuration document is not valid TOML or has the wrong shape.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("Invalid value '{value}' for {name}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Scoring service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Base URL of the service (the endpoint path is appended).
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ScoringConfig {
    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Imagery settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageryConfig {
    /// WMTS base URL.
    pub tile_base: String,
    /// Days between today and the newest date assumed to have imagery.
    pub lag_days: u32,
    /// Custom layer catalog; empty means the built-in layers.
    #[serde(default)]
    pub layers: Vec<LayerDescriptor>,
}

impl ImageryConfig {
    /// The layers to register.
    #[must_use]
    pub fn descriptors(&self) -> Vec<LayerDescriptor> {
        if self.layers.is_empty() {
            default_catalog()
        } else {
            self.layers.clone()
        }
    }
}

/// Analysis settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Length of the default climate window.
    pub default_range_days: u64,
}

/// Initial map view.
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    /// Initial center latitude.
    pub center_lat: f64,
    /// Initial center longitude.
    pub center_lon: f64,
    /// Initial zoom level.
    pub zoom: u8,
}

impl MapConfig {
    /// Initial center.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinateError`] if the configured center is out of
    /// range.
    pub fn center(&self) -> Result<LatLng, InvalidCoordinateError> {
        LatLng::new(self.center_lat, self.center_lon)
    }
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Scoring service.
    pub scoring: ScoringConfig,
    /// Imagery layers.
    pub imagery: ImageryConfig,
    /// Analysis defaults.
    pub analysis: AnalysisConfig,
    /// Initial map view.
    pub map: MapConfig,
    /// Place search.
    pub geocoder: SearchConfig,
}

impl DashboardConfig {
    /// Loads the defaults, merges `path` over them if given, then applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or an
    /// environment override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let user = match path {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|source| {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            })?),
            None => None,
        };

        let mut config = Self::from_toml(user.as_deref())?;
        config.apply_env(|name| std::env::var(name).ok())?;

        if let Some(path) = path {
            log::info!("Loaded configuration from {}", path.display());
        }
        Ok(config)
    }

    /// Parses the defaults with an optional user document merged over them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if either document is invalid.
    pub fn from_toml(user: Option<&str>) -> Result<Self, ConfigError> {
        let mut table: toml::Table = toml::from_str(DEFAULT_TOML)?;
        if let Some(user) = user {
            let overrides: toml::Table = toml::from_str(user)?;
            merge_tables(&mut table, overrides);
        }
        Ok(toml::Value::Table(table).try_into()?)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `HOTSPOT_IMAGERY_LAG_DAYS` is
    /// not a non-negative integer.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(ENV_SCORING_URL) {
            self.scoring.base_url = url;
        }
        if let Some(url) = lookup(ENV_TILE_BASE) {
            self.imagery.tile_base = url;
        }
        if let Some(url) = lookup(ENV_NOMINATIM_URL) {
            self.geocoder.base_url = url;
        }
        if let Some(value) = lookup(ENV_IMAGERY_LAG_DAYS) {
            self.imagery.lag_days = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_IMAGERY_LAG_DAYS,
                value,
            })?;
        }
        Ok(())
    }
}

impl Default for DashboardConfig {
    /// The embedded defaults.
    ///
    /// # Panics
    ///
    /// Panics if the embedded `default.toml` is malformed (caught by the
    /// test suite).
    fn default() -> Self {
        Self::from_toml(None)
            .unwrap_or_else(|e| panic!("Embedded default configuration is invalid: {e}"))
    }
}

fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}
