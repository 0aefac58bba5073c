#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Structure types and placement records.
//!
//! A *structure* is a candidate infrastructure site the user drops on the
//! map. These types are shared by the placement store, the scoring request
//! builder and the result renderer.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Kind of structure being sited.
///
/// Serialized in lowercase (`"house"`, `"hospital"`, ...), which is also
/// the `type` value the scoring service expects.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StructureType {
    /// Residential housing
    House,
    /// Hospital or clinic
    Hospital,
    /// School
    School,
    /// Public park or green space
    Park,
    /// Water treatment or supply plant
    Water,
}

impl StructureType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::House,
            Self::Hospital,
            Self::School,
            Self::Park,
            Self::Water,
        ]
    }

    /// Human-readable label for list rows and popups.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::House => "House",
            Self::Hospital => "Hospital",
            Self::School => "School",
            Self::Park => "Park",
            Self::Water => "Water plant",
        }
    }
}

/// A WGS84 coordinate that is known to be in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    lat: f64,
    lon: f64,
}

impl LatLng {
    /// Creates a coordinate.
    ///
    /// # Errors
    ///
    /// Returns an error if latitude is outside `[-90, 90]`, longitude is
    /// outside `[-180, 180]`, or either value is not finite.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinateError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinateError::Latitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidCoordinateError::Longitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lon(self) -> f64 {
        self.lon
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}

/// Error returned when a coordinate is out of range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidCoordinateError {
    /// Latitude outside `[-90, 90]`.
    Latitude(f64),
    /// Longitude outside `[-180, 180]`.
    Longitude(f64),
}

impl fmt::Display for InvalidCoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latitude(v) => write!(f, "Latitude must be between -90 and 90 (got {v})"),
            Self::Longitude(v) => write!(f, "Longitude must be between -180 and 180 (got {v})"),
        }
    }
}

impl std::error::Error for InvalidCoordinateError {}

/// Stable identifier of a placed structure, assigned by the placement
/// store. Identifiers are never reused within a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StructureId(u64);

impl StructureId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "structure-{}", self.0)
    }
}

/// A structure the user has placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedStructure {
    /// Identifier, also used to key the map marker.
    pub id: StructureId,
    /// What is being sited.
    pub structure_type: StructureType,
    /// Current marker position.
    pub position: LatLng,
    /// Whether the marker can be dragged. Always `true` for user placements.
    pub draggable: bool,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn structure_type_round_trips_wire_name() {
        for ty in StructureType::all() {
            assert_eq!(StructureType::from_str(ty.as_ref()).unwrap(), *ty);
        }
        assert_eq!(StructureType::from_str("Hospital").unwrap(), StructureType::Hospital);
        assert_eq!(
            serde_json::to_string(&StructureType::Water).unwrap(),
            "\"water\""
        );
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(LatLng::new(90.0, 180.0).is_ok());
        assert!(LatLng::new(-90.0, -180.0).is_ok());
        assert_eq!(
            LatLng::new(90.5, 0.0),
            Err(InvalidCoordinateError::Latitude(90.5))
        );
        assert_eq!(
            LatLng::new(0.0, -181.0),
            Err(InvalidCoordinateError::Longitude(-181.0))
        );
        assert!(LatLng::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn formats_coordinates() {
        let p = LatLng::new(28.6139, 77.209).unwrap();
        assert_eq!(p.to_string(), "28.61390, 77.20900");
    }
}
