//! Everything a dashboard session knows, in one place.

use hotspot_map_imagery::LayerRegistry;
use hotspot_map_placement::PlacementController;
use hotspot_map_placement_models::LatLng;
use hotspot_map_render::ResultRenderer;
use hotspot_map_scoring::DateRange;
use strum_macros::{AsRefStr, Display};

/// Progress of the analyze flow.
///
/// `Idle -> Requesting -> Rendered`, or back to `Idle` when the request
/// fails. A failure leaves whatever was rendered before on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum AnalysisPhase {
    /// No request in flight and nothing fresh rendered.
    #[default]
    Idle,
    /// A scoring request is in flight.
    Requesting,
    /// The results of the last request are displayed.
    Rendered,
}

/// Severity of a [`UserMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum MessageLevel {
    /// Informational.
    Info,
    /// Something the user should fix (bad input, nothing placed).
    Warning,
    /// A request failed.
    Error,
}

/// The status line shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    /// Severity.
    pub level: MessageLevel,
    /// Text shown to the user.
    pub text: String,
}

/// Center and zoom of the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    /// Center coordinate.
    pub center: LatLng,
    /// Zoom level.
    pub zoom: u8,
}

/// Mutable state of one dashboard session.
///
/// `T` is the tile source handle of the map engine the session drives.
#[derive(Debug)]
pub struct SessionState<T> {
    pub(crate) range: DateRange,
    pub(crate) layers: LayerRegistry<T>,
    pub(crate) placement: PlacementController,
    pub(crate) renderer: ResultRenderer,
    pub(crate) warnings: Vec<String>,
    pub(crate) phase: AnalysisPhase,
    pub(crate) loading: bool,
    pub(crate) message: Option<UserMessage>,
    pub(crate) view: MapView,
}

impl<T> SessionState<T> {
    pub(crate) fn new(range: DateRange, layers: LayerRegistry<T>, view: MapView) -> Self {
        Self {
            range,
            layers,
            placement: PlacementController::new(),
            renderer: ResultRenderer::new(),
            warnings: Vec::new(),
            phase: AnalysisPhase::Idle,
            loading: false,
            message: None,
            view,
        }
    }

    /// The climate date range.
    #[must_use]
    pub const fn range(&self) -> DateRange {
        self.range
    }

    /// The imagery layers.
    #[must_use]
    pub const fn layers(&self) -> &LayerRegistry<T> {
        &self.layers
    }

    /// Placed structures and the placement mode.
    #[must_use]
    pub const fn placement(&self) -> &PlacementController {
        &self.placement
    }

    /// Warnings the scoring service attached to the displayed results.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Progress of the analyze flow.
    #[must_use]
    pub const fn phase(&self) -> AnalysisPhase {
        self.phase
    }

    /// Whether the loading indicator is shown.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// The latest status message.
    #[must_use]
    pub const fn message(&self) -> Option<&UserMessage> {
        self.message.as_ref()
    }

    /// Current map view.
    #[must_use]
    pub const fn view(&self) -> MapView {
        self.view
    }

    pub(crate) fn report(&mut self, level: MessageLevel, text: impl Into<String>) {
        let text = text.into();
        match level {
            MessageLevel::Info => log::info!("{text}"),
            MessageLevel::Warning => log::warn!("{text}"),
            MessageLevel::Error => log::error!("{text}"),
        }
        self.message = Some(UserMessage { level, text });
    }
}
