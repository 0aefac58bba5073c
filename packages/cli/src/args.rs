//! Parsing of structure and coordinate arguments.

use std::str::FromStr;

use clap::Args;
use hotspot_map_placement_models::{LatLng, StructureType};
use hotspot_map_scoring::Covariates;
use thiserror::Error;

/// A malformed `--place` or coordinate argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    /// Missing the `type:` prefix.
    #[error("Expected TYPE:LAT,LON (e.g. hospital:28.61,77.21), got '{0}'")]
    MissingType(String),

    /// Unknown structure type.
    #[error("Unknown structure type '{0}' (expected one of: house, hospital, school, park, water)")]
    UnknownType(String),

    /// Not a `lat,lon` pair.
    #[error("Expected LAT,LON, got '{0}'")]
    Coordinates(String),

    /// Latitude or longitude out of range.
    #[error("{0}")]
    OutOfRange(String),
}

/// A structure to place, given as `type:lat,lon`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementArg {
    pub structure_type: StructureType,
    pub position: LatLng,
}

impl FromStr for PlacementArg {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ty, coords) = s
            .split_once(':')
            .ok_or_else(|| ArgError::MissingType(s.to_string()))?;
        let structure_type = ty
            .trim()
            .parse()
            .map_err(|_| ArgError::UnknownType(ty.trim().to_string()))?;
        Ok(Self {
            structure_type,
            position: parse_lat_lon(coords)?,
        })
    }
}

/// Parses `"lat,lon"` (whitespace allowed around either number).
pub fn parse_lat_lon(s: &str) -> Result<LatLng, ArgError> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| ArgError::Coordinates(s.to_string()))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| ArgError::Coordinates(s.to_string()))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| ArgError::Coordinates(s.to_string()))?;
    LatLng::new(lat, lon).map_err(|e| ArgError::OutOfRange(e.to_string()))
}

/// Covariate overrides sent with every scored point.
#[derive(Debug, Default, Args)]
pub struct CovariateArgs {
    /// Vegetation index (NDVI, 0-1)
    #[arg(long)]
    pub ndvi: Option<f64>,
    /// Population estimate around each point
    #[arg(long)]
    pub population: Option<u64>,
    /// Distance to the nearest road (km)
    #[arg(long)]
    pub road_km: Option<f64>,
    /// Distance to the nearest water body (km)
    #[arg(long)]
    pub water_km: Option<f64>,
}

impl CovariateArgs {
    /// The built-in covariates with the given overrides applied.
    #[must_use]
    pub fn covariates(&self) -> Covariates {
        let defaults = Covariates::default();
        Covariates {
            ndvi: self.ndvi.unwrap_or(defaults.ndvi),
            population: self.population.unwrap_or(defaults.population),
            road_km: self.road_km.unwrap_or(defaults.road_km),
            water_km: self.water_km.unwrap_or(defaults.water_km),
        }
    }
}

/// Arguments of the `analyze` subcommand.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Structure to place, as TYPE:LAT,LON (repeatable, scored in order)
    #[arg(long = "place", required = true)]
    pub places: Vec<PlacementArg>,
    /// First day of the climate window (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// Last day of the climate window (YYYY-MM-DD); also the imagery date
    #[arg(long)]
    pub end: Option<String>,
    /// Also print the detail view of result N (1-based)
    #[arg(long)]
    pub detail: Option<usize>,
    #[command(flatten)]
    pub covariates: CovariateArgs,
}

/// Arguments of the `score` subcommand.
#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// Structure to score, as TYPE:LAT,LON
    #[arg(long)]
    pub place: PlacementArg,
    /// First day of the climate window (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// Last day of the climate window (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    #[command(flatten)]
    pub covariates: CovariateArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_placement() {
        let arg: PlacementArg = "Hospital: 28.62, 77.21".parse().unwrap();
        assert_eq!(arg.structure_type, StructureType::Hospital);
        assert!((arg.position.lat() - 28.62).abs() < 1e-9);
        assert!((arg.position.lon() - 77.21).abs() < 1e-9);
    }

    #[test]
    fn rejects_malformed_placements() {
        assert!(matches!(
            "28.6,77.2".parse::<PlacementArg>(),
            Err(ArgError::MissingType(_))
        ));
        assert!(matches!(
            "factory:28.6,77.2".parse::<PlacementArg>(),
            Err(ArgError::UnknownType(_))
        ));
        assert!(matches!(
            "house:28.6".parse::<PlacementArg>(),
            Err(ArgError::Coordinates(_))
        ));
        assert!(matches!(
            "house:28.6,200".parse::<PlacementArg>(),
            Err(ArgError::OutOfRange(_))
        ));
    }

    #[test]
    fn covariate_overrides_fall_back_to_defaults() {
        let args = CovariateArgs {
            population: Some(15_000),
            water_km: Some(0.4),
            ..CovariateArgs::default()
        };
        let covariates = args.covariates();
        assert_eq!(covariates.population, 15_000);
        assert!((covariates.water_km - 0.4).abs() < f64::EPSILON);
        assert!((covariates.ndvi - Covariates::default().ndvi).abs() < f64::EPSILON);
        assert_eq!(CovariateArgs::default().covariates(), Covariates::default());
    }

    #[test]
    fn parses_bare_coordinates() {
        let position = parse_lat_lon("-33.86,151.21").unwrap();
        assert!((position.lat() + 33.86).abs() < 1e-9);
        assert!(parse_lat_lon("north, east").is_err());
    }
}
