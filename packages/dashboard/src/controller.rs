//! The dashboard controller.
//!
//! [`Dashboard`] owns the map engine, the scoring backend and the
//! [`SessionState`], and is the only thing that mutates them. Every user
//! interaction (date inputs, layer checkboxes, map clicks and drags, the
//! analyze button, the search box) is one method call.

use std::sync::Arc;

use chrono::NaiveDate;
use hotspot_map_geocoder::{GeocodeError, GeocodedPlace, PlaceSearch};
use hotspot_map_imagery::{
    LayerRegistry, MapSurface, RebuildReport, TileUrlBuilder, default_imagery_date,
};
use hotspot_map_imagery_models::LayerKey;
use hotspot_map_placement::{PlacementEvent, PlacementOutcome};
use hotspot_map_placement_models::{LatLng, StructureId, StructureType};
use hotspot_map_render::{ResultDetail, ResultMarker, ResultRow, ScoreColor};
use hotspot_map_scoring::{
    Covariates, DateRange, ScoringService, ValidationError, build_point_query, build_request,
};
use hotspot_map_scoring_models::PointScore;

use crate::{
    AnalysisPhase, AnalyzeError, DashboardConfig, DateChangeError, MapEngine, MapView,
    MessageLevel, SessionState,
};

/// Something that can show the user a request is in flight.
pub trait LoadingIndicator: Send + Sync {
    /// Shows the indicator with `message`.
    fn start(&self, message: &str);

    /// Hides the indicator.
    fn finish(&self);
}

/// Marks the session as loading for as long as it is alive.
///
/// Dropping it (normally, or because the request future was dropped) hides
/// the loading indicator and returns a still-requesting session to `Idle`.
struct RequestGuard<'a, T> {
    session: &'a mut SessionState<T>,
    indicator: Option<Arc<dyn LoadingIndicator>>,
    analysis: bool,
}

impl<'a, T> RequestGuard<'a, T> {
    /// Enters the `Requesting` phase of an analysis.
    fn analysis(
        session: &'a mut SessionState<T>,
        indicator: Option<Arc<dyn LoadingIndicator>>,
        message: &str,
    ) -> Self {
        session.phase = AnalysisPhase::Requesting;
        Self::enter(session, indicator, message, true)
    }

    /// Shows the loading state without touching the analysis phase.
    fn loading(
        session: &'a mut SessionState<T>,
        indicator: Option<Arc<dyn LoadingIndicator>>,
        message: &str,
    ) -> Self {
        Self::enter(session, indicator, message, false)
    }

    fn enter(
        session: &'a mut SessionState<T>,
        indicator: Option<Arc<dyn LoadingIndicator>>,
        message: &str,
        analysis: bool,
    ) -> Self {
        session.loading = true;
        if let Some(indicator) = &indicator {
            indicator.start(message);
        }
        Self {
            session,
            indicator,
            analysis,
        }
    }
}

impl<T> Drop for RequestGuard<'_, T> {
    fn drop(&mut self) {
        self.session.loading = false;
        if self.analysis && self.session.phase == AnalysisPhase::Requesting {
            self.session.phase = AnalysisPhase::Idle;
        }
        if let Some(indicator) = &self.indicator {
            indicator.finish();
        }
    }
}

/// A dashboard session bound to a map engine and a scoring backend.
pub struct Dashboard<M: MapEngine, S> {
    map: M,
    scoring: S,
    session: SessionState<<M as MapSurface>::TileSource>,
    covariates: Covariates,
    loading_indicator: Option<Arc<dyn LoadingIndicator>>,
}

impl<M: MapEngine, S: ScoringService> Dashboard<M, S> {
    /// Starts a session.
    ///
    /// The imagery date and the end of the climate range both default to
    /// `today` minus the configured imagery lag; the range starts
    /// `default_range_days` earlier. Layers that fail to build are logged
    /// and stay pending until a later date change builds them.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Coordinates`] if the configured map center
    /// is out of range.
    pub fn new(
        config: &DashboardConfig,
        mut map: M,
        scoring: S,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let center = config.map.center()?;
        let end = default_imagery_date(today, config.imagery.lag_days);
        let range = DateRange::ending_on(end, config.analysis.default_range_days);

        let urls = TileUrlBuilder::new(config.imagery.tile_base.clone());
        let mut layers = LayerRegistry::new(urls);
        let report = layers.initialize(&mut map, config.imagery.descriptors(), end);
        if !report.is_complete() {
            log::warn!("Imagery layers unavailable: {}", join_keys(&report.failed));
        }

        map.set_view(center, config.map.zoom);
        let view = MapView {
            center,
            zoom: config.map.zoom,
        };

        log::info!(
            "Session started: imagery date {end}, climate range {} to {}",
            range.start(),
            range.end()
        );

        Ok(Self {
            map,
            scoring,
            session: SessionState::new(range, layers, view),
            covariates: Covariates::default(),
            loading_indicator: None,
        })
    }

    /// Shows `indicator` while scoring requests are in flight.
    #[must_use]
    pub fn with_loading_indicator(mut self, indicator: Arc<dyn LoadingIndicator>) -> Self {
        self.loading_indicator = Some(indicator);
        self
    }

    /// Uses `covariates` for every scored point instead of the defaults.
    #[must_use]
    pub fn with_covariates(mut self, covariates: Covariates) -> Self {
        self.covariates = covariates;
        self
    }

    /// Session state.
    #[must_use]
    pub const fn session(&self) -> &SessionState<<M as MapSurface>::TileSource> {
        &self.session
    }

    /// The map engine.
    #[must_use]
    pub const fn map(&self) -> &M {
        &self.map
    }

    /// The scoring backend.
    #[must_use]
    pub const fn scoring(&self) -> &S {
        &self.scoring
    }

    // Dates and layers

    /// Changes the start of the climate range. Imagery is not refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvertedDateRange`] if `start` is after the
    /// current end; the range is left unchanged.
    pub fn set_start_date(&mut self, start: NaiveDate) -> Result<(), ValidationError> {
        let range = self.validated_range(start, self.session.range.end())?;
        self.session.range = range;
        Ok(())
    }

    /// Changes the end of the climate range and rebuilds every imagery layer
    /// for that date.
    ///
    /// # Errors
    ///
    /// Returns [`DateChangeError::Validation`] if `end` is before the current
    /// start; nothing is changed in that case.
    pub fn set_end_date(&mut self, end: NaiveDate) -> Result<RebuildReport, DateChangeError> {
        let range = self.validated_range(self.session.range.start(), end)?;
        self.session.range = range;
        self.refresh_imagery(end)
    }

    /// Applies the two date inputs at once.
    ///
    /// Imagery is rebuilt only if the end date changed; the report of that
    /// rebuild is returned.
    ///
    /// # Errors
    ///
    /// Returns [`DateChangeError::Validation`] if either input is malformed
    /// or the range is inverted; nothing is changed in that case.
    pub fn set_range_from_inputs(
        &mut self,
        start: &str,
        end: &str,
    ) -> Result<Option<RebuildReport>, DateChangeError> {
        let range = match DateRange::parse(start, end) {
            Ok(range) => range,
            Err(e) => {
                self.session.report(MessageLevel::Warning, e.to_string());
                return Err(e.into());
            }
        };

        let end_changed = range.end() != self.session.range.end();
        self.session.range = range;

        if end_changed {
            Ok(Some(self.refresh_imagery(range.end())?))
        } else {
            Ok(None)
        }
    }

    /// Shows or hides an imagery layer. Unknown keys are ignored.
    pub fn toggle_layer(&mut self, key: &LayerKey, visible: bool) -> bool {
        self.session.layers.toggle(&mut self.map, key, visible)
    }

    fn validated_range(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DateRange, ValidationError> {
        DateRange::new(start, end).inspect_err(|e| {
            self.session.report(MessageLevel::Warning, e.to_string());
        })
    }

    fn refresh_imagery(&mut self, date: NaiveDate) -> Result<RebuildReport, DateChangeError> {
        let report = self.session.layers.set_date(&mut self.map, date)?;
        if !report.is_complete() {
            self.session.report(
                MessageLevel::Warning,
                format!(
                    "Imagery for {date} could not be loaded for: {}",
                    join_keys(&report.failed)
                ),
            );
        }
        Ok(report)
    }

    // Placement

    /// Applies a placement event. Any change to the placed structures clears
    /// the displayed results, which no longer describe them.
    pub fn dispatch(&mut self, event: PlacementEvent) -> PlacementOutcome {
        let outcome = self.session.placement.dispatch(event);
        if outcome.changes_placements() {
            self.invalidate_results();
        }
        outcome
    }

    /// Enters placement mode for `structure_type`.
    pub fn arm(&mut self, structure_type: StructureType) -> PlacementOutcome {
        self.dispatch(PlacementEvent::Arm(structure_type))
    }

    /// Leaves placement mode.
    pub fn cancel_placement(&mut self) -> PlacementOutcome {
        self.dispatch(PlacementEvent::Cancel)
    }

    /// Handles a click on the map at `(lat, lon)`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Coordinates`] if the position is out of
    /// range.
    pub fn handle_map_click(
        &mut self,
        lat: f64,
        lon: f64,
    ) -> Result<PlacementOutcome, ValidationError> {
        let position = self.position(lat, lon)?;
        Ok(self.dispatch(PlacementEvent::MapClick(position)))
    }

    /// Moves structure `id` to `(lat, lon)`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Coordinates`] if the position is out of
    /// range.
    pub fn drag_structure(
        &mut self,
        id: StructureId,
        lat: f64,
        lon: f64,
    ) -> Result<PlacementOutcome, ValidationError> {
        let to = self.position(lat, lon)?;
        Ok(self.dispatch(PlacementEvent::Drag { id, to }))
    }

    /// Removes structure `id`.
    pub fn remove_structure(&mut self, id: StructureId) -> PlacementOutcome {
        self.dispatch(PlacementEvent::Remove(id))
    }

    /// Removes every structure.
    pub fn clear_structures(&mut self) -> PlacementOutcome {
        self.dispatch(PlacementEvent::Clear)
    }

    fn position(&mut self, lat: f64, lon: f64) -> Result<LatLng, ValidationError> {
        LatLng::new(lat, lon).map_err(|e| {
            let e = ValidationError::from(e);
            self.session.report(MessageLevel::Warning, e.to_string());
            e
        })
    }

    fn invalidate_results(&mut self) {
        if self.session.renderer.is_empty() {
            return;
        }
        self.session.renderer.clear(&mut self.map);
        self.session.warnings.clear();
        self.session.phase = AnalysisPhase::Idle;
        log::info!("Placements changed; cleared stale analysis results");
    }

    // Analysis

    /// Whether the analyze control is enabled.
    #[must_use]
    pub const fn analyze_enabled(&self) -> bool {
        !self.session.loading
    }

    /// Scores every placed structure over the current range and renders the
    /// results. Returns the number of results rendered.
    ///
    /// The placements are snapshotted when the request is built, and the
    /// results are labeled against that snapshot.
    ///
    /// # Errors
    ///
    /// - [`AnalyzeError::Validation`] if nothing is placed or too much is;
    ///   no request is sent.
    /// - [`AnalyzeError::Scoring`] if the request fails.
    /// - [`AnalyzeError::Render`] if the result count does not match.
    ///
    /// On every error the previously rendered results stay on screen.
    pub async fn analyze(&mut self) -> Result<usize, AnalyzeError> {
        let snapshot = self.session.placement.placements().to_vec();
        let request = match build_request(&snapshot, &self.session.range, self.covariates) {
            Ok(request) => request,
            Err(e) => {
                self.session.report(MessageLevel::Warning, e.to_string());
                return Err(e.into());
            }
        };

        log::info!(
            "Requesting scores for {} structure(s), {} to {}",
            snapshot.len(),
            request.start,
            request.end
        );

        let response = {
            let _guard = RequestGuard::analysis(
                &mut self.session,
                self.loading_indicator.clone(),
                &format!("Analyzing {} structure(s)...", snapshot.len()),
            );
            self.scoring.score(&request).await
        };

        let batch = match response {
            Ok(batch) => batch,
            Err(e) => {
                self.session
                    .report(MessageLevel::Error, format!("Analysis failed: {e}"));
                return Err(e.into());
            }
        };

        let count = batch.results.len();
        if let Err(e) = self
            .session
            .renderer
            .render(&mut self.map, batch.results, &snapshot)
        {
            self.session
                .report(MessageLevel::Error, format!("Analysis failed: {e}"));
            return Err(e.into());
        }

        let text = if batch.warnings.is_empty() {
            format!("Analyzed {count} structure(s)")
        } else {
            format!(
                "Analyzed {count} structure(s) with {} warning(s)",
                batch.warnings.len()
            )
        };
        self.session.warnings = batch.warnings;
        self.session.phase = AnalysisPhase::Rendered;
        self.session.report(MessageLevel::Info, text);
        Ok(count)
    }

    /// Scores structure `id` on its own over the current range.
    ///
    /// The rendered results are left alone. Returns `None` for an unknown
    /// id.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Scoring`] if the request fails.
    pub async fn score_structure(
        &mut self,
        id: StructureId,
    ) -> Result<Option<PointScore>, AnalyzeError> {
        let Some(placement) = self.session.placement.store().get(id) else {
            log::debug!("Ignoring score of unknown {id}");
            return Ok(None);
        };
        let structure_type = placement.structure_type;
        let query = build_point_query(placement, &self.session.range, self.covariates);

        let response = {
            let _guard = RequestGuard::loading(
                &mut self.session,
                self.loading_indicator.clone(),
                &format!("Scoring {}...", structure_type.label()),
            );
            self.scoring.score_point(&query).await
        };

        match response {
            Ok(score) => {
                self.session.report(
                    MessageLevel::Info,
                    format!(
                        "{} scored {:.1} ({})",
                        structure_type.label(),
                        score.result.score,
                        ScoreColor::from_score(score.result.score)
                    ),
                );
                Ok(Some(score))
            }
            Err(e) => {
                self.session
                    .report(MessageLevel::Error, format!("Scoring failed: {e}"));
                Err(e.into())
            }
        }
    }

    /// Result list rows.
    #[must_use]
    pub fn rows(&self) -> &[ResultRow] {
        self.session.renderer.rows()
    }

    /// Result markers.
    #[must_use]
    pub fn markers(&self) -> &[ResultMarker] {
        self.session.renderer.markers()
    }

    /// Detail view of result `index`.
    #[must_use]
    pub fn detail(&self, index: usize) -> Option<ResultDetail<'_>> {
        self.session.renderer.detail(index)
    }

    /// Detail view of the result for structure `id`.
    #[must_use]
    pub fn detail_for(&self, id: StructureId) -> Option<ResultDetail<'_>> {
        self.session.renderer.index_of(id).and_then(|i| self.detail(i))
    }

    // View

    /// Moves the map.
    pub fn recenter(&mut self, center: LatLng, zoom: u8) {
        self.map.set_view(center, zoom);
        self.session.view = MapView { center, zoom };
    }

    /// Searches for `query` and recenters the map on the best match.
    ///
    /// Returns `None` (and leaves the view alone) if nothing matched.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the search fails or the match has
    /// out-of-range coordinates.
    pub async fn search_and_recenter<P: PlaceSearch + ?Sized>(
        &mut self,
        search: &P,
        query: &str,
    ) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let found = match search.search(query).await {
            Ok(found) => found,
            Err(e) => {
                self.session
                    .report(MessageLevel::Error, format!("Search failed: {e}"));
                return Err(e);
            }
        };

        let Some(place) = found else {
            self.session.report(
                MessageLevel::Warning,
                format!("No place found for '{}'", query.trim()),
            );
            return Ok(None);
        };

        let center = match LatLng::new(place.latitude, place.longitude) {
            Ok(center) => center,
            Err(e) => {
                let e = GeocodeError::Parse {
                    message: e.to_string(),
                };
                self.session
                    .report(MessageLevel::Error, format!("Search failed: {e}"));
                return Err(e);
            }
        };

        let zoom = place.zoom_hint.unwrap_or(self.session.view.zoom);
        self.recenter(center, zoom);
        self.session.report(
            MessageLevel::Info,
            format!(
                "Centered on {}",
                place.display_name.as_deref().unwrap_or_else(|| query.trim())
            ),
        );
        Ok(Some(place))
    }
}

fn join_keys(keys: &[LayerKey]) -> String {
    keys.iter()
        .map(LayerKey::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
