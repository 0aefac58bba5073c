#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client side of the hotspot scoring service.
//!
//! [`request::build_request`] turns the placed structures and a
//! [`request::DateRange`] into a [`ScoreRequest`], rejecting anything the
//! service would refuse before a request is ever sent. The request is then
//! handed to a [`ScoringService`]; [`http::HttpScoringService`] is the
//! production implementation. Single structures can also be scored on their
//! own through [`ScoringService::score_point`].

pub mod http;
pub mod request;

use hotspot_map_placement_models::InvalidCoordinateError;
use hotspot_map_scoring_models::{AnalysisResult, PointQuery, PointScore, ScoreRequest};
use thiserror::Error;

pub use http::HttpScoringService;
pub use request::{Covariates, DateRange, build_point_query, build_request};

/// Maximum number of points the scoring service accepts per request.
pub const MAX_POINTS_PER_REQUEST: usize = 50;

/// Input problems detected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Analysis was requested with nothing placed.
    #[error("Place at least one structure before running an analysis")]
    NoPlacements,

    /// More points than the service accepts in one request.
    #[error("Too many structures: {count} placed, at most {max} can be analyzed at once")]
    TooManyPoints {
        /// Number of placed structures.
        count: usize,
        /// The service limit.
        max: usize,
    },

    /// The end of the date range is before its start.
    #[error("End date {end} is before start date {start}")]
    InvertedDateRange {
        /// Requested start (`YYYY-MM-DD`).
        start: String,
        /// Requested end (`YYYY-MM-DD`).
        end: String,
    },

    /// A date input could not be parsed.
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    /// A coordinate is out of range.
    #[error("{message}")]
    Coordinates {
        /// Description of the bad coordinate.
        message: String,
    },
}

impl From<InvalidCoordinateError> for ValidationError {
    fn from(e: InvalidCoordinateError) -> Self {
        Self::Coordinates {
            message: e.to_string(),
        }
    }
}

/// Failures of a scoring call.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Scoring service returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, or the body itself.
        message: String,
    },

    /// The service answered 2xx with an `error` field.
    #[error("Scoring service error: {message}")]
    Service {
        /// The reported error.
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("Malformed scoring response: {message}")]
    Malformed {
        /// Description of the parsing failure.
        message: String,
    },
}

/// Successful scoring response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoredBatch {
    /// One result per request point, in request order.
    pub results: Vec<AnalysisResult>,
    /// Per-point warnings reported by the service.
    pub warnings: Vec<String>,
}

/// A remote (or simulated) scoring backend.
#[async_trait::async_trait]
pub trait ScoringService: Send + Sync {
    /// Scores every point of `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError`] on transport failures, non-2xx responses,
    /// an `error` field in the body, or an unparseable body.
    async fn score(&self, request: &ScoreRequest) -> Result<ScoredBatch, ScoringError>;

    /// Scores a single point.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::score`].
    async fn score_point(&self, query: &PointQuery) -> Result<PointScore, ScoringError>;
}
