#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rendering of hotspot analysis results.
//!
//! Results come back from the scoring service as a bare array that is
//! matched to the placed structures by position. [`renderer::ResultRenderer`]
//! holds the single current result array and derives from it:
//!
//! - one colored overlay marker per result (pushed to an
//!   [`renderer::OverlaySurface`]),
//! - one list row per result, in result order,
//! - an index-addressable detail view.
//!
//! [`color`] holds the two independent color scales: the 3-way score
//! rating and the 5-bucket temperature heatmap.

pub mod color;
pub mod renderer;

use thiserror::Error;

pub use color::{ScoreColor, TemperatureBucket, TemperatureScale};
pub use renderer::{OverlaySurface, ResultDetail, ResultMarker, ResultRenderer, ResultRow};

/// Errors from rendering a result set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The service returned a different number of results than points were
    /// sent, so results cannot be matched to structures by position.
    #[error(
        "Scoring service returned {results} result(s) for {placements} structure(s); \
         results cannot be matched to structures"
    )]
    LengthMismatch {
        /// Number of results received.
        results: usize,
        /// Number of structures sent.
        placements: usize,
    },
}
