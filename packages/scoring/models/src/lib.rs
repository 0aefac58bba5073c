#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Request and response types of the hotspot scoring service.
//!
//! `POST /api/hotspot_score` answers with one result per request point, in
//! request order. Results carry no identifier of their own, so index `i` of
//! [`ScoreResponse::results`] belongs to index `i` of
//! [`ScoreRequest::points`].
//!
//! `GET /api/analyze_point` scores a single point given as query
//! parameters ([`PointQuery`]) and answers with a [`PointScore`].

use hotspot_map_placement_models::StructureType;
use serde::{Deserialize, Serialize};

/// One point to be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Kind of structure being sited.
    #[serde(rename = "type")]
    pub structure_type: StructureType,
    /// Vegetation index in `[0, 1]`.
    pub ndvi: f64,
    /// Population estimate around the point.
    pub population: u64,
    /// Distance to the nearest road in kilometres.
    pub road_km: f64,
    /// Distance to the nearest water body in kilometres.
    pub water_km: f64,
}

/// Body of a scoring request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    /// Points in placement order.
    pub points: Vec<ScorePoint>,
    /// First day of the climate window (`YYYYMMDD`).
    pub start: String,
    /// Last day of the climate window (`YYYYMMDD`).
    pub end: String,
}

/// Climate averages over the requested window. Every field is optional;
/// the service omits or nulls values it could not fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerSummary {
    /// Mean air temperature at 2 m (°C).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_temp: Option<f64>,
    /// Mean daily precipitation (mm/day).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_precip: Option<f64>,
    /// Mean relative humidity at 2 m (%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_humidity: Option<f64>,
    /// Mean all-sky surface shortwave irradiance (kWh/m²/day).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_solar: Option<f64>,
    /// Mean wind speed at 2 m (m/s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_wind: Option<f64>,
    /// Number of days the averages were computed over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_days: Option<u32>,
}

/// Score of a single point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Latitude of the scored point.
    pub lat: f64,
    /// Longitude of the scored point.
    pub lon: f64,
    /// Suitability score, 0–100.
    pub score: f64,
    /// Vegetation index used for scoring.
    pub ndvi: f64,
    /// Population used for scoring.
    pub population: u64,
    /// Climate averages used for scoring.
    #[serde(default)]
    pub power_summary: PowerSummary,
    /// Structure type echoed back by the service, if it sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure_type: Option<String>,
}

impl AnalysisResult {
    /// Mean temperature of the window, if known.
    #[must_use]
    pub const fn mean_temp(&self) -> Option<f64> {
        self.power_summary.mean_temp
    }
}

/// Raw response body. Exactly one of `results` or `error` is expected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    /// Results in request order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<AnalysisResult>>,
    /// Per-point problems the service skipped over.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Request-level failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Query parameters of `GET /api/analyze_point`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointQuery {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Kind of structure being sited.
    #[serde(rename = "type")]
    pub structure_type: StructureType,
    /// Vegetation index in `[0, 1]`.
    pub ndvi: f64,
    /// Population estimate around the point.
    pub population: u64,
    /// Distance to the nearest road in kilometres.
    pub road_km: f64,
    /// Distance to the nearest water body in kilometres.
    pub water_km: f64,
    /// First day of the climate window (`YYYYMMDD`).
    pub start: String,
    /// Last day of the climate window (`YYYYMMDD`).
    pub end: String,
}

/// Successful single-point response: the usual result plus the distance
/// covariates the service scored with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointScore {
    /// The score and the inputs it was computed from.
    #[serde(flatten)]
    pub result: AnalysisResult,
    /// Road distance used for scoring (km).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_km: Option<f64>,
    /// Water distance used for scoring (km).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_km: Option<f64>,
}
