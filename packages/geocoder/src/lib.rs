#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place search for the hotspot map.
//!
//! Resolves a free-text query ("Connaught Place, Delhi") to a single
//! center coordinate that the map can be recentered on. The only provider
//! is Nominatim / `OpenStreetMap`, reached through [`nominatim`]; callers
//! that want to swap it out (or stub it in tests) go through the
//! [`PlaceSearch`] trait.

pub mod nominatim;

use serde::Deserialize;
use thiserror::Error;

pub use nominatim::NominatimSearch;

/// A search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Display name returned by the provider.
    pub display_name: Option<String>,
    /// Suggested zoom level for the hit, when the provider reports a
    /// bounding box.
    pub zoom_hint: Option<u8>,
}

/// Errors from place search.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The query was empty.
    #[error("Search query is empty")]
    EmptyQuery,
}

/// Provider connection settings, as found in the dashboard configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint (e.g. `"https://nominatim.openstreetmap.org/search"`).
    pub base_url: String,
    /// `User-Agent` sent with every request; Nominatim's usage policy
    /// requires an identifying one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    format!("hotspot-map/{}", env!("CARGO_PKG_VERSION"))
}

/// Resolves free-text queries to coordinates.
#[async_trait::async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Returns the best match for `query`, or `None` if nothing matched.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the query is empty or the provider call
    /// fails.
    async fn search(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError>;
}
