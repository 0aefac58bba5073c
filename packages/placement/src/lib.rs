#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Placement of candidate structures on the map.
//!
//! - [`store::PlacementStore`] is the ordered collection of placed
//!   structures. Its insertion order is the order points are sent to the
//!   scoring service, and therefore the order results are read back in.
//! - [`mode::PlacementController`] wraps the store with the
//!   `Idle`/`Placing(type)` state machine and a single
//!   [`mode::PlacementEvent`] dispatch entry point for map interaction.

pub mod mode;
pub mod store;

pub use mode::{PlacementController, PlacementEvent, PlacementMode, PlacementOutcome};
pub use store::PlacementStore;
