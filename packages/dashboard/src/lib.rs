#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The hotspot map dashboard.
//!
//! Ties the imagery layers, structure placement, the scoring service and
//! result rendering into one session:
//!
//! - [`session::SessionState`] holds everything the session knows (date
//!   range, layers, placements, current results, status message, view).
//! - [`controller::Dashboard`] is the only thing that mutates it, one
//!   method per user interaction, including the async analyze flow.
//! - [`config::DashboardConfig`] is the layered TOML + environment
//!   configuration.
//! - [`headless::HeadlessMap`] is an in-memory [`MapEngine`] for the CLI and
//!   tests.

pub mod config;
pub mod controller;
pub mod headless;
pub mod session;

use hotspot_map_imagery::{MapSurface, RegistryError};
use hotspot_map_placement_models::LatLng;
use hotspot_map_render::{OverlaySurface, RenderError};
use hotspot_map_scoring::{ScoringError, ValidationError};
use thiserror::Error;

pub use config::{ConfigError, DashboardConfig};
pub use controller::{Dashboard, LoadingIndicator};
pub use headless::{HeadlessMap, HeadlessTileSource};
pub use session::{AnalysisPhase, MapView, MessageLevel, SessionState, UserMessage};

/// Everything the dashboard needs from a map engine.
pub trait MapEngine: MapSurface + OverlaySurface {
    /// Moves the map to `center` at `zoom`.
    fn set_view(&mut self, center: LatLng, zoom: u8);
}

/// Errors from [`Dashboard::analyze`].
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The request could not be built; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The scoring call failed.
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// The response could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors from changing the date range.
#[derive(Debug, Error)]
pub enum DateChangeError {
    /// The new range is invalid; nothing was changed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The imagery layers could not be updated.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
