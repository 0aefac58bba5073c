//! Ordered store of placed structures.

use hotspot_map_placement_models::{LatLng, PlacedStructure, StructureId, StructureType};

/// Placed structures in insertion order.
#[derive(Debug, Default)]
pub struct PlacementStore {
    entries: Vec<PlacedStructure>,
    next_id: u64,
}

impl PlacementStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a structure and returns its identifier.
    pub fn place(&mut self, position: LatLng, structure_type: StructureType) -> StructureId {
        self.next_id += 1;
        let id = StructureId::new(self.next_id);
        self.entries.push(PlacedStructure {
            id,
            structure_type,
            position,
            draggable: true,
        });
        log::debug!("Placed {structure_type} {id} at {position}");
        id
    }

    /// Moves a structure. Unknown identifiers are ignored.
    ///
    /// Returns whether a structure was moved.
    pub fn move_to(&mut self, id: StructureId, position: LatLng) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            log::debug!("Ignoring move of unknown {id}");
            return false;
        };
        entry.position = position;
        true
    }

    /// Removes a structure and returns it, if present.
    pub fn remove(&mut self, id: StructureId) -> Option<PlacedStructure> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx))
    }

    /// Removes every structure.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All structures in insertion order.
    #[must_use]
    pub fn list(&self) -> &[PlacedStructure] {
        &self.entries
    }

    /// Looks up a structure by identifier.
    #[must_use]
    pub fn get(&self, id: StructureId) -> Option<&PlacedStructure> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Number of placed structures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no structures are placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
