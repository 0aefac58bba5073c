//! Turns a scored result set into markers, list rows and detail views.

use hotspot_map_placement_models::{PlacedStructure, StructureId, StructureType};
use hotspot_map_scoring_models::AnalysisResult;

use crate::{RenderError, ScoreColor, TemperatureBucket, TemperatureScale};

/// Map engine primitives for the result overlay.
pub trait OverlaySurface {
    /// Removes every result marker.
    fn clear_result_markers(&mut self);

    /// Adds one result marker.
    fn add_result_marker(&mut self, marker: &ResultMarker);
}

/// A colored circle drawn at a scored point.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMarker {
    /// Index into the current result array.
    pub index: usize,
    /// Latitude of the scored point.
    pub lat: f64,
    /// Longitude of the scored point.
    pub lon: f64,
    /// Fill color: the temperature bucket color when a heatmap is drawn,
    /// otherwise the score color.
    pub color: &'static str,
    /// Temperature bucket, when the heatmap is drawn and this result has a
    /// temperature.
    pub temperature_bucket: Option<TemperatureBucket>,
    /// Score rating.
    pub score_color: ScoreColor,
    /// Popup text.
    pub popup: String,
}

/// One entry of the results list.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// Index into the current result array.
    pub index: usize,
    /// Type of the structure at the same position in the request.
    pub structure_type: StructureType,
    /// Suitability score.
    pub score: f64,
    /// Score rating (badge color).
    pub score_color: ScoreColor,
}

/// Everything known about one result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultDetail<'a> {
    /// Index into the current result array.
    pub index: usize,
    /// The structure this result was requested for.
    pub placement: &'a PlacedStructure,
    /// The result itself.
    pub result: &'a AnalysisResult,
    /// Score rating.
    pub score_color: ScoreColor,
    /// Temperature bucket, if a heatmap is drawn.
    pub temperature_bucket: Option<TemperatureBucket>,
}

impl ResultDetail<'_> {
    /// Human-readable lines for a detail panel.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        let r = self.result;
        let p = &r.power_summary;
        let mut lines = vec![
            format!(
                "{} #{} at {:.5}, {:.5}",
                self.placement.structure_type.label(),
                self.index + 1,
                r.lat,
                r.lon
            ),
            format!("Score: {:.2} ({})", r.score, self.score_color),
            format!("NDVI: {:.2}", r.ndvi),
            format!("Population: {}", r.population),
        ];

        let metrics = [
            ("Mean temperature", p.mean_temp, "°C"),
            ("Mean precipitation", p.mean_precip, "mm/day"),
            ("Mean humidity", p.mean_humidity, "%"),
            ("Mean solar irradiance", p.mean_solar, "kWh/m²/day"),
            ("Mean wind speed", p.mean_wind, "m/s"),
        ];
        for (name, value, unit) in metrics {
            match value {
                Some(v) => lines.push(format!("{name}: {v:.2} {unit}")),
                None => lines.push(format!("{name}: n/a")),
            }
        }

        if let Some(n) = p.n_days {
            lines.push(format!("Days of climate data: {n}"));
        }
        if let Some(bucket) = self.temperature_bucket {
            lines.push(format!("Heat bucket: {bucket}"));
        }
        lines
    }
}

/// Holds the current result array and everything derived from it.
///
/// The result array is only ever replaced as a whole, and every accessor
/// reads from it, so a detail view opened after a newer analysis always
/// shows the newer result.
#[derive(Debug, Default)]
pub struct ResultRenderer {
    results: Vec<AnalysisResult>,
    placements: Vec<PlacedStructure>,
    scale: Option<TemperatureScale>,
    rows: Vec<ResultRow>,
    markers: Vec<ResultMarker>,
}

impl ResultRenderer {
    /// Creates an empty renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current result set and redraws the overlay.
    ///
    /// `placements` must be the structures the request was built from, in
    /// request order; result `i` is labeled with placement `i`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::LengthMismatch`] if the counts differ. The
    /// previous result set and overlay are left untouched in that case.
    pub fn render<O: OverlaySurface + ?Sized>(
        &mut self,
        overlay: &mut O,
        results: Vec<AnalysisResult>,
        placements: &[PlacedStructure],
    ) -> Result<(), RenderError> {
        if results.len() != placements.len() {
            return Err(RenderError::LengthMismatch {
                results: results.len(),
                placements: placements.len(),
            });
        }

        for (result, placement) in results.iter().zip(placements) {
            if let Some(echoed) = &result.structure_type
                && !echoed.eq_ignore_ascii_case(placement.structure_type.as_ref())
            {
                log::warn!(
                    "Result for {} echoes type '{echoed}' but a {} was requested",
                    placement.id,
                    placement.structure_type
                );
            }
        }

        let scale = TemperatureScale::from_results(&results);
        if scale.is_none() {
            log::info!("No temperature data in results; skipping heatmap");
        }

        let mut rows = Vec::with_capacity(results.len());
        let mut markers = Vec::with_capacity(results.len());

        for (index, (result, placement)) in results.iter().zip(placements).enumerate() {
            let score_color = ScoreColor::from_score(result.score);
            let temperature_bucket = bucket_for(scale.as_ref(), result);

            rows.push(ResultRow {
                index,
                structure_type: placement.structure_type,
                score: result.score,
                score_color,
            });

            markers.push(ResultMarker {
                index,
                lat: result.lat,
                lon: result.lon,
                color: temperature_bucket.map_or(score_color.hex(), TemperatureBucket::hex),
                temperature_bucket,
                score_color,
                popup: popup_text(placement.structure_type, result, score_color),
            });
        }

        overlay.clear_result_markers();
        for marker in &markers {
            overlay.add_result_marker(marker);
        }

        log::info!("Rendered {} analysis result(s)", results.len());

        self.results = results;
        self.placements = placements.to_vec();
        self.scale = scale;
        self.rows = rows;
        self.markers = markers;
        Ok(())
    }

    /// Drops the current result set and its markers.
    pub fn clear<O: OverlaySurface + ?Sized>(&mut self, overlay: &mut O) {
        if self.results.is_empty() {
            return;
        }
        overlay.clear_result_markers();
        *self = Self::default();
    }

    /// Whether no result set is displayed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// List rows in result order.
    #[must_use]
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Overlay markers in result order.
    #[must_use]
    pub fn markers(&self) -> &[ResultMarker] {
        &self.markers
    }

    /// The temperature scale of the current results, if a heatmap is drawn.
    #[must_use]
    pub const fn temperature_scale(&self) -> Option<&TemperatureScale> {
        self.scale.as_ref()
    }

    /// Index of the result belonging to structure `id`, if it was part of
    /// the current result set.
    #[must_use]
    pub fn index_of(&self, id: StructureId) -> Option<usize> {
        self.placements.iter().position(|p| p.id == id)
    }

    /// Detail view of result `index`.
    #[must_use]
    pub fn detail(&self, index: usize) -> Option<ResultDetail<'_>> {
        let result = self.results.get(index)?;
        let placement = self.placements.get(index)?;
        Some(ResultDetail {
            index,
            placement,
            result,
            score_color: ScoreColor::from_score(result.score),
            temperature_bucket: bucket_for(self.scale.as_ref(), result),
        })
    }
}

fn bucket_for(
    scale: Option<&TemperatureScale>,
    result: &AnalysisResult,
) -> Option<TemperatureBucket> {
    let t = result.mean_temp().filter(|t| t.is_finite())?;
    scale.map(|s| s.bucket(t))
}

fn popup_text(ty: StructureType, result: &AnalysisResult, rating: ScoreColor) -> String {
    let temp = result
        .mean_temp()
        .map_or_else(|| "n/a".to_string(), |t| format!("{t:.1} °C"));
    format!(
        "{}\nScore: {:.1} ({rating})\nMean temp: {temp}",
        ty.label(),
        result.score
    )
}

#[cfg(test)]
mod tests {
    use hotspot_map_placement_models::LatLng;
    use hotspot_map_scoring_models::PowerSummary;

    use super::*;

    #[derive(Default)]
    struct RecordingOverlay {
        markers: Vec<ResultMarker>,
        clears: usize,
    }

    impl OverlaySurface for RecordingOverlay {
        fn clear_result_markers(&mut self) {
            self.clears += 1;
            self.markers.clear();
        }

        fn add_result_marker(&mut self, marker: &ResultMarker) {
            self.markers.push(marker.clone());
        }
    }

    fn placement(id: u64, ty: StructureType, lat: f64, lon: f64) -> PlacedStructure {
        PlacedStructure {
            id: StructureId::new(id),
            structure_type: ty,
            position: LatLng::new(lat, lon).unwrap(),
            draggable: true,
        }
    }

    fn result(lat: f64, lon: f64, score: f64, temp: Option<f64>) -> AnalysisResult {
        AnalysisResult {
            lat,
            lon,
            score,
            ndvi: 0.2,
            population: 2000,
            power_summary: PowerSummary {
                mean_temp: temp,
                n_days: Some(31),
                ..PowerSummary::default()
            },
            structure_type: None,
        }
    }

    fn three_placements() -> Vec<PlacedStructure> {
        vec![
            placement(1, StructureType::House, 10.0, 10.0),
            placement(2, StructureType::Hospital, 20.0, 20.0),
            placement(3, StructureType::School, 30.0, 30.0),
        ]
    }

    #[test]
    fn one_marker_and_row_per_result_in_order() {
        let placements = three_placements();
        let results = vec![
            result(10.0, 10.0, 80.0, Some(20.0)),
            result(20.0, 20.0, 45.0, Some(30.0)),
            result(30.0, 30.0, 60.0, Some(25.0)),
        ];
        let mut overlay = RecordingOverlay::default();
        let mut renderer = ResultRenderer::new();

        renderer.render(&mut overlay, results, &placements).unwrap();

        assert_eq!(overlay.markers.len(), 3);
        assert_eq!(renderer.rows().len(), 3);
        let types: Vec<StructureType> = renderer.rows().iter().map(|r| r.structure_type).collect();
        assert_eq!(
            types,
            vec![StructureType::House, StructureType::Hospital, StructureType::School]
        );
        let colors: Vec<ScoreColor> = renderer.rows().iter().map(|r| r.score_color).collect();
        assert_eq!(
            colors,
            vec![ScoreColor::Good, ScoreColor::Poor, ScoreColor::Moderate]
        );
        let buckets: Vec<Option<TemperatureBucket>> =
            overlay.markers.iter().map(|m| m.temperature_bucket).collect();
        assert_eq!(
            buckets,
            vec![
                Some(TemperatureBucket::Cool),
                Some(TemperatureBucket::Hot),
                Some(TemperatureBucket::Medium)
            ]
        );
        assert_eq!(overlay.markers[1].color, TemperatureBucket::Hot.hex());
        assert!(overlay.markers[1].popup.starts_with("Hospital"));
    }

    #[test]
    fn rows_are_not_sorted_by_score() {
        let placements = three_placements();
        let results = vec![
            result(10.0, 10.0, 10.0, None),
            result(20.0, 20.0, 90.0, None),
            result(30.0, 30.0, 50.0, None),
        ];
        let mut renderer = ResultRenderer::new();
        renderer
            .render(&mut RecordingOverlay::default(), results, &placements)
            .unwrap();
        let scores: Vec<f64> = renderer.rows().iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![10.0, 90.0, 50.0]);
    }

    #[test]
    fn missing_temperatures_fall_back_to_score_color() {
        let placements = three_placements();
        let results = vec![
            result(10.0, 10.0, 80.0, None),
            result(20.0, 20.0, 45.0, None),
            result(30.0, 30.0, 60.0, None),
        ];
        let mut overlay = RecordingOverlay::default();
        let mut renderer = ResultRenderer::new();
        renderer.render(&mut overlay, results, &placements).unwrap();

        assert!(renderer.temperature_scale().is_none());
        assert!(overlay.markers.iter().all(|m| m.temperature_bucket.is_none()));
        assert_eq!(overlay.markers[0].color, ScoreColor::Good.hex());
    }

    #[test]
    fn uniform_temperature_marks_everything_medium() {
        let placements = three_placements();
        let results = vec![
            result(10.0, 10.0, 80.0, Some(22.0)),
            result(20.0, 20.0, 45.0, Some(22.0)),
            result(30.0, 30.0, 60.0, Some(22.0)),
        ];
        let mut overlay = RecordingOverlay::default();
        let mut renderer = ResultRenderer::new();
        renderer.render(&mut overlay, results, &placements).unwrap();
        assert!(
            overlay
                .markers
                .iter()
                .all(|m| m.temperature_bucket.map(TemperatureBucket::index) == Some(2))
        );
    }

    #[test]
    fn rerender_replaces_the_whole_overlay() {
        let placements = three_placements();
        let mut overlay = RecordingOverlay::default();
        let mut renderer = ResultRenderer::new();
        renderer
            .render(
                &mut overlay,
                vec![
                    result(10.0, 10.0, 80.0, None),
                    result(20.0, 20.0, 45.0, None),
                    result(30.0, 30.0, 60.0, None),
                ],
                &placements,
            )
            .unwrap();

        let fewer = &placements[..1];
        renderer
            .render(&mut overlay, vec![result(10.0, 10.0, 12.0, None)], fewer)
            .unwrap();

        assert_eq!(overlay.clears, 2);
        assert_eq!(overlay.markers.len(), 1);
        assert_eq!(renderer.rows().len(), 1);
        assert!(renderer.detail(1).is_none());
        assert!((renderer.detail(0).unwrap().result.score - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn length_mismatch_keeps_previous_render() {
        let placements = three_placements();
        let mut overlay = RecordingOverlay::default();
        let mut renderer = ResultRenderer::new();
        renderer
            .render(
                &mut overlay,
                vec![
                    result(10.0, 10.0, 80.0, None),
                    result(20.0, 20.0, 45.0, None),
                    result(30.0, 30.0, 60.0, None),
                ],
                &placements,
            )
            .unwrap();

        let err = renderer
            .render(&mut overlay, vec![result(1.0, 1.0, 99.0, None)], &placements)
            .unwrap_err();

        assert_eq!(
            err,
            RenderError::LengthMismatch {
                results: 1,
                placements: 3
            }
        );
        assert_eq!(overlay.clears, 1);
        assert_eq!(overlay.markers.len(), 3);
        assert_eq!(renderer.rows().len(), 3);
    }

    #[test]
    fn detail_reads_current_results() {
        let placements = three_placements();
        let mut renderer = ResultRenderer::new();
        let mut overlay = RecordingOverlay::default();
        renderer
            .render(
                &mut overlay,
                vec![
                    result(10.0, 10.0, 80.0, Some(18.0)),
                    result(20.0, 20.0, 45.0, Some(28.0)),
                    result(30.0, 30.0, 60.0, None),
                ],
                &placements,
            )
            .unwrap();

        let detail = renderer.detail(1).unwrap();
        assert_eq!(detail.placement.structure_type, StructureType::Hospital);
        assert_eq!(detail.score_color, ScoreColor::Poor);
        let lines = detail.summary_lines();
        assert!(lines[0].starts_with("Hospital #2"));
        assert!(lines.iter().any(|l| l == "Mean temperature: 28.00 °C"));
        assert!(lines.iter().any(|l| l == "Mean wind speed: n/a"));
        assert!(renderer.detail(2).unwrap().temperature_bucket.is_none());
        assert!(renderer.detail(3).is_none());
        assert_eq!(renderer.index_of(StructureId::new(3)), Some(2));
    }

    #[test]
    fn clear_removes_markers() {
        let placements = three_placements();
        let mut overlay = RecordingOverlay::default();
        let mut renderer = ResultRenderer::new();
        renderer
            .render(
                &mut overlay,
                vec![
                    result(10.0, 10.0, 80.0, None),
                    result(20.0, 20.0, 45.0, None),
                    result(30.0, 30.0, 60.0, None),
                ],
                &placements,
            )
            .unwrap();

        renderer.clear(&mut overlay);
        assert!(renderer.is_empty());
        assert!(renderer.rows().is_empty());
        assert!(overlay.markers.is_empty());
    }
}
