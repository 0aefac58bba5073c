//! Building scoring requests from placed structures.

use chrono::{Days, NaiveDate};
use hotspot_map_placement_models::PlacedStructure;
use hotspot_map_scoring_models::{PointQuery, ScorePoint, ScoreRequest};

use crate::{MAX_POINTS_PER_REQUEST, ValidationError};

/// Length of the default climate window in days.
pub const DEFAULT_RANGE_DAYS: u64 = 30;

/// An inclusive range of calendar days with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvertedDateRange`] if `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvertedDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parses a range from two `YYYY-MM-DD` inputs.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if either date is malformed or the range
    /// is inverted.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// The `days`-long window ending on `end`.
    #[must_use]
    pub fn ending_on(end: NaiveDate, days: u64) -> Self {
        let start = end.checked_sub_days(Days::new(days)).unwrap_or(end);
        Self { start, end }
    }

    /// First day of the range.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the range.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Parses a `YYYY-MM-DD` date input.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] if the input is not a valid
/// calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        value: value.to_string(),
    })
}

/// Formats a date the way the scoring service expects (`YYYYMMDD`).
#[must_use]
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Environmental covariates attached to every point.
///
/// There is no data source for these yet, so every point gets the same
/// fixed values (the service's own defaults).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Covariates {
    /// Vegetation index.
    pub ndvi: f64,
    /// Population estimate.
    pub population: u64,
    /// Distance to the nearest road (km).
    pub road_km: f64,
    /// Distance to the nearest water body (km).
    pub water_km: f64,
}

impl Default for Covariates {
    fn default() -> Self {
        Self {
            ndvi: 0.2,
            population: 2000,
            road_km: 1.0,
            water_km: 2.0,
        }
    }
}

/// Builds the scoring request for `placements` over `range`.
///
/// Points are emitted in placement order; results must be read back in the
/// same order.
///
/// # Errors
///
/// Returns [`ValidationError::NoPlacements`] if `placements` is empty and
/// [`ValidationError::TooManyPoints`] if it exceeds
/// [`MAX_POINTS_PER_REQUEST`].
pub fn build_request(
    placements: &[PlacedStructure],
    range: &DateRange,
    covariates: Covariates,
) -> Result<ScoreRequest, ValidationError> {
    if placements.is_empty() {
        return Err(ValidationError::NoPlacements);
    }
    if placements.len() > MAX_POINTS_PER_REQUEST {
        return Err(ValidationError::TooManyPoints {
            count: placements.len(),
            max: MAX_POINTS_PER_REQUEST,
        });
    }

    let points = placements
        .iter()
        .map(|p| ScorePoint {
            lat: p.position.lat(),
            lon: p.position.lon(),
            structure_type: p.structure_type,
            ndvi: covariates.ndvi,
            population: covariates.population,
            road_km: covariates.road_km,
            water_km: covariates.water_km,
        })
        .collect();

    Ok(ScoreRequest {
        points,
        start: compact_date(range.start),
        end: compact_date(range.end),
    })
}

/// Builds the single-point query for `placement` over `range`.
#[must_use]
pub fn build_point_query(
    placement: &PlacedStructure,
    range: &DateRange,
    covariates: Covariates,
) -> PointQuery {
    PointQuery {
        lat: placement.position.lat(),
        lon: placement.position.lon(),
        structure_type: placement.structure_type,
        ndvi: covariates.ndvi,
        population: covariates.population,
        road_km: covariates.road_km,
        water_km: covariates.water_km,
        start: compact_date(range.start),
        end: compact_date(range.end),
    }
}

#[cfg(test)]
mod tests {
    use hotspot_map_placement_models::{LatLng, StructureId, StructureType};

    use super::*;

    fn placement(id: u64, ty: StructureType, lat: f64, lon: f64) -> PlacedStructure {
        PlacedStructure {
            id: StructureId::new(id),
            structure_type: ty,
            position: LatLng::new(lat, lon).unwrap(),
            draggable: true,
        }
    }

    fn january() -> DateRange {
        DateRange::parse("2024-01-01", "2024-01-31").unwrap()
    }

    #[test]
    fn builds_points_in_placement_order() {
        let placements = vec![
            placement(1, StructureType::House, 28.6, 77.2),
            placement(2, StructureType::Hospital, 28.7, 77.1),
            placement(3, StructureType::School, 28.5, 77.3),
        ];
        let request = build_request(&placements, &january(), Covariates::default()).unwrap();

        assert_eq!(request.start, "20240101");
        assert_eq!(request.end, "20240131");
        let types: Vec<StructureType> = request.points.iter().map(|p| p.structure_type).collect();
        assert_eq!(
            types,
            vec![StructureType::House, StructureType::Hospital, StructureType::School]
        );
        assert!((request.points[1].lat - 28.7).abs() < f64::EPSILON);
        assert_eq!(request.points[0].population, 2000);
        assert!((request.points[2].water_km - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_query_carries_covariates_and_range() {
        let covariates = Covariates {
            population: 12_000,
            road_km: 0.3,
            ..Covariates::default()
        };
        let query = build_point_query(
            &placement(7, StructureType::Hospital, 28.6, 77.2),
            &january(),
            covariates,
        );
        assert_eq!(query.structure_type, StructureType::Hospital);
        assert_eq!(query.population, 12_000);
        assert!((query.road_km - 0.3).abs() < f64::EPSILON);
        assert!((query.ndvi - 0.2).abs() < f64::EPSILON);
        assert_eq!((query.start.as_str(), query.end.as_str()), ("20240101", "20240131"));
    }

    #[test]
    fn rejects_empty_placements() {
        assert_eq!(
            build_request(&[], &january(), Covariates::default()),
            Err(ValidationError::NoPlacements)
        );
    }

    #[test]
    fn rejects_oversized_requests() {
        let placements: Vec<PlacedStructure> = (0..=MAX_POINTS_PER_REQUEST as u64)
            .map(|i| placement(i, StructureType::Park, 0.0, 0.0))
            .collect();
        assert!(matches!(
            build_request(&placements, &january(), Covariates::default()),
            Err(ValidationError::TooManyPoints { count: 51, max: 50 })
        ));
    }

    #[test]
    fn validates_date_inputs() {
        assert!(matches!(
            DateRange::parse("2024-02-01", "2024-01-01"),
            Err(ValidationError::InvertedDateRange { .. })
        ));
        assert!(matches!(
            DateRange::parse("2024-13-01", "2024-12-31"),
            Err(ValidationError::InvalidDate { .. })
        ));
        assert!(matches!(
            DateRange::parse("", "2024-12-31"),
            Err(ValidationError::InvalidDate { .. })
        ));
        let single_day = DateRange::parse("2024-05-05", " 2024-05-05 ").unwrap();
        assert_eq!(single_day.start(), single_day.end());
    }

    #[test]
    fn default_window_ends_on_given_day() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let range = DateRange::ending_on(end, DEFAULT_RANGE_DAYS);
        assert_eq!(range.start(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(range.end(), end);
    }
}
