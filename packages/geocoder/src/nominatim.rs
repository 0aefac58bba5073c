//! Nominatim / `OpenStreetMap` free-form search.
//!
//! The public instance allows at most **1 request per second**. Searches
//! are user-initiated one at a time, so no client-side throttling is done.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use crate::{GeocodeError, GeocodedPlace, PlaceSearch, SearchConfig};

/// Nominatim-backed [`PlaceSearch`].
pub struct NominatimSearch {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimSearch {
    /// Creates a search client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl PlaceSearch for NominatimSearch {
    async fn search(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        log::debug!("Nominatim search: {query}");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        parse_response(&body)
    }
}

/// Parses Nominatim JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedPlace>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = parse_coordinate(&first["lat"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lat in Nominatim response".to_string(),
    })?;

    let lon = parse_coordinate(&first["lon"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lon in Nominatim response".to_string(),
    })?;

    Ok(Some(GeocodedPlace {
        latitude: lat,
        longitude: lon,
        display_name: first["display_name"].as_str().map(String::from),
        zoom_hint: zoom_for_bounding_box(&first["boundingbox"]),
    }))
}

fn parse_coordinate(value: &serde_json::Value) -> Option<f64> {
    value.as_str().and_then(|s| s.parse::<f64>().ok())
}

/// Picks a zoom level that roughly fits a `[south, north, west, east]`
/// bounding box.
fn zoom_for_bounding_box(value: &serde_json::Value) -> Option<u8> {
    let bbox: Vec<f64> = value
        .as_array()?
        .iter()
        .filter_map(parse_coordinate)
        .collect();
    let [south, north, west, east] = bbox.as_slice() else {
        return None;
    };
    let extent = (north - south).abs().max((east - west).abs());

    Some(match extent {
        e if e > 20.0 => 4,
        e if e > 5.0 => 6,
        e if e > 1.0 => 8,
        e if e > 0.25 => 10,
        e if e > 0.05 => 12,
        _ => 14,
    })
}
