//! In-memory map engine.
//!
//! [`HeadlessMap`] keeps track of what a real map would show (attached tile
//! layers, result markers, the current view) without drawing anything. The
//! CLI drives a whole session against it, and the tests use it to observe
//! what the dashboard did to the map.

use std::collections::{BTreeMap, BTreeSet};

use hotspot_map_imagery::{LayerBuildError, MapSurface};
use hotspot_map_imagery_models::{LayerDescriptor, LayerKey};
use hotspot_map_placement_models::LatLng;
use hotspot_map_render::{OverlaySurface, ResultMarker};

use crate::{MapEngine, MapView};

/// A tile layer created by a [`HeadlessMap`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessTileSource {
    /// Engine-unique handle.
    pub id: u64,
    /// Layer the source was built for.
    pub layer: LayerKey,
    /// Tile template URL.
    pub url: String,
    /// Opacity, clamped to `[0, 1]`.
    pub opacity: f32,
    /// Highest zoom level tiles are requested for.
    pub max_zoom: u8,
}

/// A map engine that only records state.
#[derive(Debug, Default)]
pub struct HeadlessMap {
    next_id: u64,
    attached: BTreeMap<u64, HeadlessTileSource>,
    rejected: BTreeSet<LayerKey>,
    markers: Vec<ResultMarker>,
    view: Option<MapView>,
}

impl HeadlessMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later attempt to build a source for `key` fail.
    pub fn reject_layer(&mut self, key: impl Into<LayerKey>) {
        self.rejected.insert(key.into());
    }

    /// Accepts `key` again after [`Self::reject_layer`].
    pub fn accept_layer(&mut self, key: &LayerKey) {
        self.rejected.remove(key);
    }

    /// Attached tile sources in creation order.
    pub fn attached(&self) -> impl Iterator<Item = &HeadlessTileSource> {
        self.attached.values()
    }

    /// The attached source of `key`, if any.
    #[must_use]
    pub fn attached_source(&self, key: &LayerKey) -> Option<&HeadlessTileSource> {
        self.attached.values().find(|s| s.layer == *key)
    }

    /// Result markers currently drawn.
    #[must_use]
    pub fn markers(&self) -> &[ResultMarker] {
        &self.markers
    }

    /// The last view set on the map.
    #[must_use]
    pub const fn view(&self) -> Option<MapView> {
        self.view
    }
}

impl MapSurface for HeadlessMap {
    type TileSource = HeadlessTileSource;

    fn create_tile_source(
        &mut self,
        descriptor: &LayerDescriptor,
        url_template: &str,
    ) -> Result<HeadlessTileSource, LayerBuildError> {
        if self.rejected.contains(&descriptor.key) {
            return Err(LayerBuildError {
                key: descriptor.key.clone(),
                message: "layer rejected by map engine".to_string(),
            });
        }

        self.next_id += 1;
        Ok(HeadlessTileSource {
            id: self.next_id,
            layer: descriptor.key.clone(),
            url: url_template.to_string(),
            opacity: descriptor.clamped_opacity(),
            max_zoom: descriptor.max_zoom,
        })
    }

    fn attach(&mut self, source: &HeadlessTileSource) {
        log::trace!("attach {} ({})", source.layer, source.url);
        self.attached.insert(source.id, source.clone());
    }

    fn detach(&mut self, source: &HeadlessTileSource) {
        log::trace!("detach {}", source.layer);
        self.attached.remove(&source.id);
    }
}

impl OverlaySurface for HeadlessMap {
    fn clear_result_markers(&mut self) {
        self.markers.clear();
    }

    fn add_result_marker(&mut self, marker: &ResultMarker) {
        self.markers.push(marker.clone());
    }
}

impl MapEngine for HeadlessMap {
    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.view = Some(MapView { center, zoom });
    }
}
