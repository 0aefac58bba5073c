//! Placement-mode state machine.
//!
//! The map has two interaction modes: `Idle`, where clicks do nothing, and
//! `Placing(type)`, where every click drops a structure of that type. All
//! map interaction goes through [`PlacementController::dispatch`], so no
//! click handlers need to be attached or detached when the mode changes.

use hotspot_map_placement_models::{LatLng, PlacedStructure, StructureId, StructureType};

use crate::PlacementStore;

/// Current map interaction mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlacementMode {
    /// Clicks on the map are ignored.
    #[default]
    Idle,
    /// Clicks on the map place a structure of the given type. The mode stays
    /// armed until cancelled so several structures can be placed in a row.
    Placing(StructureType),
}

/// A user interaction relevant to placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementEvent {
    /// A structure type was picked from the toolbar.
    Arm(StructureType),
    /// Placement was cancelled (e.g. Escape pressed).
    Cancel,
    /// The map was clicked.
    MapClick(LatLng),
    /// A structure marker was dragged to a new position.
    Drag {
        /// The dragged structure.
        id: StructureId,
        /// Where it was dropped.
        to: LatLng,
    },
    /// A structure was removed from its popup.
    Remove(StructureId),
    /// "Clear all" was pressed.
    Clear,
}

/// What a dispatched event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// The interaction mode changed.
    ModeChanged(PlacementMode),
    /// A structure was placed.
    Placed(StructureId),
    /// A structure was moved.
    Moved(StructureId),
    /// A structure was removed.
    Removed(StructureId),
    /// Every structure was removed.
    Cleared,
    /// Nothing happened (click while idle, stale id, ...).
    Ignored,
}

impl PlacementOutcome {
    /// Whether the set or positions of placed structures changed.
    #[must_use]
    pub const fn changes_placements(self) -> bool {
        matches!(
            self,
            Self::Placed(_) | Self::Moved(_) | Self::Removed(_) | Self::Cleared
        )
    }
}

/// The placement store together with the interaction mode.
#[derive(Debug, Default)]
pub struct PlacementController {
    mode: PlacementMode,
    store: PlacementStore,
}

impl PlacementController {
    /// Creates an idle controller with an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current interaction mode.
    #[must_use]
    pub const fn mode(&self) -> PlacementMode {
        self.mode
    }

    /// Read access to the placed structures.
    #[must_use]
    pub const fn store(&self) -> &PlacementStore {
        &self.store
    }

    /// Placed structures in request order.
    #[must_use]
    pub fn placements(&self) -> &[PlacedStructure] {
        self.store.list()
    }

    /// Applies a single interaction event.
    pub fn dispatch(&mut self, event: PlacementEvent) -> PlacementOutcome {
        match (self.mode, event) {
            (_, PlacementEvent::Arm(ty)) => self.set_mode(PlacementMode::Placing(ty)),
            (PlacementMode::Placing(_), PlacementEvent::Cancel) => {
                self.set_mode(PlacementMode::Idle)
            }
            (PlacementMode::Idle, PlacementEvent::Cancel | PlacementEvent::MapClick(_)) => {
                PlacementOutcome::Ignored
            }
            (PlacementMode::Placing(ty), PlacementEvent::MapClick(position)) => {
                PlacementOutcome::Placed(self.store.place(position, ty))
            }
            (_, PlacementEvent::Drag { id, to }) => {
                if self.store.move_to(id, to) {
                    PlacementOutcome::Moved(id)
                } else {
                    PlacementOutcome::Ignored
                }
            }
            (_, PlacementEvent::Remove(id)) => match self.store.remove(id) {
                Some(_) => PlacementOutcome::Removed(id),
                None => PlacementOutcome::Ignored,
            },
            (_, PlacementEvent::Clear) => {
                if self.store.is_empty() {
                    PlacementOutcome::Ignored
                } else {
                    self.store.clear();
                    PlacementOutcome::Cleared
                }
            }
        }
    }

    fn set_mode(&mut self, mode: PlacementMode) -> PlacementOutcome {
        log::debug!("Placement mode: {:?} -> {mode:?}", self.mode);
        self.mode = mode;
        PlacementOutcome::ModeChanged(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(lat: f64, lon: f64) -> PlacementEvent {
        PlacementEvent::MapClick(LatLng::new(lat, lon).unwrap())
    }

    #[test]
    fn clicks_while_idle_are_ignored() {
        let mut ctl = PlacementController::new();
        assert_eq!(ctl.dispatch(click(1.0, 1.0)), PlacementOutcome::Ignored);
        assert!(ctl.placements().is_empty());
    }

    #[test]
    fn armed_mode_places_until_cancelled() {
        let mut ctl = PlacementController::new();
        ctl.dispatch(PlacementEvent::Arm(StructureType::School));

        assert!(matches!(ctl.dispatch(click(1.0, 1.0)), PlacementOutcome::Placed(_)));
        assert!(matches!(ctl.dispatch(click(2.0, 2.0)), PlacementOutcome::Placed(_)));

        assert_eq!(
            ctl.dispatch(PlacementEvent::Cancel),
            PlacementOutcome::ModeChanged(PlacementMode::Idle)
        );
        assert_eq!(ctl.dispatch(click(3.0, 3.0)), PlacementOutcome::Ignored);

        assert_eq!(ctl.placements().len(), 2);
        assert!(
            ctl.placements()
                .iter()
                .all(|p| p.structure_type == StructureType::School)
        );
    }

    #[test]
    fn rearming_switches_type() {
        let mut ctl = PlacementController::new();
        ctl.dispatch(PlacementEvent::Arm(StructureType::House));
        ctl.dispatch(PlacementEvent::Arm(StructureType::Park));
        assert_eq!(ctl.mode(), PlacementMode::Placing(StructureType::Park));
        ctl.dispatch(click(0.0, 0.0));
        assert_eq!(ctl.placements()[0].structure_type, StructureType::Park);
    }

    #[test]
    fn stale_drag_and_remove_are_ignored() {
        let mut ctl = PlacementController::new();
        ctl.dispatch(PlacementEvent::Arm(StructureType::House));
        let PlacementOutcome::Placed(id) = ctl.dispatch(click(1.0, 1.0)) else {
            panic!("expected a placement");
        };

        assert_eq!(ctl.dispatch(PlacementEvent::Remove(id)), PlacementOutcome::Removed(id));
        let drag = PlacementEvent::Drag {
            id,
            to: LatLng::new(4.0, 4.0).unwrap(),
        };
        assert_eq!(ctl.dispatch(drag), PlacementOutcome::Ignored);
        assert_eq!(ctl.dispatch(PlacementEvent::Remove(id)), PlacementOutcome::Ignored);
        assert_eq!(ctl.dispatch(PlacementEvent::Clear), PlacementOutcome::Ignored);
    }

    #[test]
    fn only_store_mutations_change_placements() {
        assert!(PlacementOutcome::Cleared.changes_placements());
        assert!(PlacementOutcome::Moved(StructureId::new(1)).changes_placements());
        assert!(!PlacementOutcome::Ignored.changes_placements());
        assert!(
            !PlacementOutcome::ModeChanged(PlacementMode::Idle).changes_placements()
        );
    }
}
