//! Registry of imagery layers and their per-date tile sources.
//!
//! Each registered layer keeps three pieces of state that change for
//! different reasons:
//!
//! - **visibility** changes only through [`LayerRegistry::toggle`];
//! - **the date** changes only through [`LayerRegistry::set_date`];
//! - **the tile source** is rebuilt whenever the date changes and is always
//!   the one built for `(descriptor, built_for_date)`.
//!
//! A date change rebuilds every layer, attached or not, so a later toggle
//! shows the current date. Attached layers get the new source attached
//! before the old one is removed, so a visible layer never disappears.
//!
//! A layer whose source has never been built stays registered as *pending*
//! and is retried on every date change. Its visibility is still tracked, so
//! it is attached as soon as a source can be built if it is meant to be
//! shown.

use chrono::NaiveDate;
use hotspot_map_imagery_models::{LayerDescriptor, LayerKey};

use crate::{LayerBuildError, MapSurface, RegistryError, TileUrlBuilder};

/// One registered imagery layer.
#[derive(Debug)]
pub struct LayerState<T> {
    descriptor: LayerDescriptor,
    built_for_date: Option<NaiveDate>,
    visible: bool,
    tile_source: Option<T>,
}

impl<T> LayerState<T> {
    /// Static description of the layer.
    #[must_use]
    pub const fn descriptor(&self) -> &LayerDescriptor {
        &self.descriptor
    }

    /// The layer's key.
    #[must_use]
    pub const fn key(&self) -> &LayerKey {
        &self.descriptor.key
    }

    /// Date the current tile source was built for, or `None` while the
    /// layer is pending.
    #[must_use]
    pub const fn built_for_date(&self) -> Option<NaiveDate> {
        self.built_for_date
    }

    /// Whether the layer is switched on. A pending layer can be switched on
    /// without anything being attached yet.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether no tile source could be built for this layer yet.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.tile_source.is_none()
    }

    /// Whether the layer's tile source is attached to the map.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.visible && self.tile_source.is_some()
    }

    /// The surface handle of the current tile source.
    #[must_use]
    pub const fn tile_source(&self) -> Option<&T> {
        self.tile_source.as_ref()
    }
}

/// Outcome of building or rebuilding the registered layers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    /// Layers whose tile source now matches the requested date.
    pub rebuilt: Vec<LayerKey>,
    /// Layers that could not be built for the requested date. They keep
    /// their previous source, or stay pending if they never had one.
    pub failed: Vec<LayerKey>,
}

impl RebuildReport {
    /// Whether every layer was built successfully.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Holds every imagery layer of a session.
///
/// `T` is the tile source handle type of the [`MapSurface`] the registry is
/// used with.
#[derive(Debug)]
pub struct LayerRegistry<T> {
    urls: TileUrlBuilder,
    current_date: Option<NaiveDate>,
    layers: Vec<LayerState<T>>,
}

impl<T> LayerRegistry<T> {
    /// Creates an empty, uninitialized registry.
    #[must_use]
    pub const fn new(urls: TileUrlBuilder) -> Self {
        Self {
            urls,
            current_date: None,
            layers: Vec::new(),
        }
    }

    /// Whether [`Self::initialize`] has been called.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.current_date.is_some()
    }

    /// The date every layer is (or should be) built for.
    #[must_use]
    pub const fn current_date(&self) -> Option<NaiveDate> {
        self.current_date
    }

    /// All registered layers in registration order.
    #[must_use]
    pub fn layers(&self) -> &[LayerState<T>] {
        &self.layers
    }

    /// Looks up a layer by key.
    #[must_use]
    pub fn layer(&self, key: &LayerKey) -> Option<&LayerState<T>> {
        self.layers.iter().find(|l| l.descriptor.key == *key)
    }

    /// Registers one layer per descriptor, builds each for `date` and
    /// attaches the ones marked visible by default.
    ///
    /// A descriptor whose source cannot be built is logged and registered as
    /// pending. Duplicate keys are skipped. Calling this again detaches every
    /// previously attached layer and starts over.
    pub fn initialize<S>(
        &mut self,
        surface: &mut S,
        descriptors: Vec<LayerDescriptor>,
        date: NaiveDate,
    ) -> RebuildReport
    where
        S: MapSurface<TileSource = T>,
    {
        for layer in self.layers.drain(..) {
            if layer.visible
                && let Some(source) = &layer.tile_source
            {
                surface.detach(source);
            }
        }

        let mut report = RebuildReport::default();

        for descriptor in descriptors {
            if self.layer(&descriptor.key).is_some() {
                log::warn!("Skipping duplicate imagery layer '{}'", descriptor.key);
                report.failed.push(descriptor.key);
                continue;
            }

            let mut layer = LayerState {
                visible: descriptor.visible_by_default,
                descriptor,
                built_for_date: None,
                tile_source: None,
            };

            match rebuild_layer(&self.urls, surface, &mut layer, date) {
                Ok(()) => {
                    log::debug!(
                        "Registered imagery layer '{}' for {date} (visible: {})",
                        layer.descriptor.key,
                        layer.visible
                    );
                    report.rebuilt.push(layer.descriptor.key.clone());
                }
                Err(e) => {
                    log::warn!("{e}; layer stays pending");
                    report.failed.push(layer.descriptor.key.clone());
                }
            }
            self.layers.push(layer);
        }

        self.current_date = Some(date);
        report
    }

    /// Rebuilds every layer's tile source for `date`.
    ///
    /// Attached layers are swapped in place (new source attached, then the
    /// old one detached); detached layers only have their stored source
    /// replaced. Pending layers are retried and, once built, attached if
    /// they are switched on. Visibility is never changed. A layer whose new
    /// source fails to build keeps its previous source and date, and the
    /// remaining layers are still updated.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Uninitialized`] if called before
    /// [`Self::initialize`].
    pub fn set_date<S>(
        &mut self,
        surface: &mut S,
        date: NaiveDate,
    ) -> Result<RebuildReport, RegistryError>
    where
        S: MapSurface<TileSource = T>,
    {
        if !self.is_initialized() {
            return Err(RegistryError::Uninitialized);
        }

        let mut report = RebuildReport::default();

        for layer in &mut self.layers {
            match rebuild_layer(&self.urls, surface, layer, date) {
                Ok(()) => report.rebuilt.push(layer.descriptor.key.clone()),
                Err(e) => {
                    match layer.built_for_date {
                        Some(previous) => log::warn!("{e}; keeping imagery from {previous}"),
                        None => log::warn!("{e}; layer stays pending"),
                    }
                    report.failed.push(layer.descriptor.key.clone());
                }
            }
        }

        self.current_date = Some(date);
        log::info!(
            "Imagery date set to {date} ({} rebuilt, {} failed)",
            report.rebuilt.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Switches a layer on or off, attaching or detaching its current tile
    /// source. A pending layer only records the choice.
    ///
    /// Unknown keys are ignored. Returns whether the layer's visibility
    /// changed.
    pub fn toggle<S>(&mut self, surface: &mut S, key: &LayerKey, visible: bool) -> bool
    where
        S: MapSurface<TileSource = T>,
    {
        let Some(layer) = self.layers.iter_mut().find(|l| l.descriptor.key == *key) else {
            log::debug!("Ignoring toggle of unknown imagery layer '{key}'");
            return false;
        };

        if layer.visible == visible {
            return false;
        }

        match &layer.tile_source {
            Some(source) if visible => surface.attach(source),
            Some(source) => surface.detach(source),
            None => log::debug!("Imagery layer '{key}' is pending; nothing to attach yet"),
        }
        layer.visible = visible;
        true
    }
}

fn rebuild_layer<S: MapSurface>(
    urls: &TileUrlBuilder,
    surface: &mut S,
    layer: &mut LayerState<S::TileSource>,
    date: NaiveDate,
) -> Result<(), LayerBuildError> {
    let url = urls.build(&layer.descriptor, date);
    let new_source = surface.create_tile_source(&layer.descriptor, &url)?;

    if layer.visible {
        surface.attach(&new_source);
    }
    if let Some(old) = layer.tile_source.replace(new_source)
        && layer.visible
    {
        surface.detach(&old);
    }
    layer.built_for_date = Some(date);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use hotspot_map_imagery_models::{NIGHT_LIGHTS, TEMPERATURE, VEGETATION, default_catalog};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct FakeSource {
        id: u32,
        url: String,
    }

    /// Records attachments and can be told to reject specific layers.
    #[derive(Default)]
    struct FakeMap {
        next_id: u32,
        attached: BTreeSet<u32>,
        attach_calls: u32,
        broken: BTreeSet<String>,
    }

    impl MapSurface for FakeMap {
        type TileSource = FakeSource;

        fn create_tile_source(
            &mut self,
            descriptor: &LayerDescriptor,
            url_template: &str,
        ) -> Result<FakeSource, LayerBuildError> {
            if self.broken.contains(descriptor.key.as_str()) {
                return Err(LayerBuildError {
                    key: descriptor.key.clone(),
                    message: "engine refused layer".to_string(),
                });
            }
            self.next_id += 1;
            Ok(FakeSource {
                id: self.next_id,
                url: url_template.to_string(),
            })
        }

        fn attach(&mut self, source: &FakeSource) {
            self.attach_calls += 1;
            self.attached.insert(source.id);
        }

        fn detach(&mut self, source: &FakeSource) {
            self.attached.remove(&source.id);
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (FakeMap, LayerRegistry<FakeSource>) {
        let mut map = FakeMap::default();
        let mut registry = LayerRegistry::new(TileUrlBuilder::new("https://tiles.test"));
        let report = registry.initialize(&mut map, default_catalog(), date(2024, 1, 1));
        assert!(report.is_complete());
        (map, registry)
    }

    fn visibility(registry: &LayerRegistry<FakeSource>) -> Vec<bool> {
        registry.layers().iter().map(LayerState::is_visible).collect()
    }

    #[test]
    fn initialize_attaches_only_default_layers() {
        let (map, registry) = setup();
        assert_eq!(visibility(&registry), vec![true, false, false]);
        assert_eq!(map.attached.len(), 1);
        let temperature = registry.layer(&TEMPERATURE.into()).unwrap();
        assert!(map.attached.contains(&temperature.tile_source().unwrap().id));
    }

    #[test]
    fn set_date_before_initialize_fails() {
        let mut map = FakeMap::default();
        let mut registry: LayerRegistry<FakeSource> = LayerRegistry::new(TileUrlBuilder::default());
        assert!(matches!(
            registry.set_date(&mut map, date(2024, 1, 2)),
            Err(RegistryError::Uninitialized)
        ));
        assert!(map.attached.is_empty());
    }

    #[test]
    fn set_date_preserves_visibility() {
        let (mut map, mut registry) = setup();
        registry.toggle(&mut map, &VEGETATION.into(), true);
        let before = visibility(&registry);

        registry.set_date(&mut map, date(2024, 2, 1)).unwrap();
        registry.set_date(&mut map, date(2024, 3, 1)).unwrap();

        assert_eq!(visibility(&registry), before);
        assert_eq!(map.attached.len(), 2);
    }

    #[test]
    fn set_date_rebuilds_hidden_layers_without_attaching() {
        let (mut map, mut registry) = setup();
        let night = LayerKey::from(NIGHT_LIGHTS);
        let old_id = registry.layer(&night).unwrap().tile_source().unwrap().id;

        registry.set_date(&mut map, date(2024, 1, 15)).unwrap();

        let layer = registry.layer(&night).unwrap();
        assert_ne!(layer.tile_source().unwrap().id, old_id);
        assert!(layer.tile_source().unwrap().url.contains("/2024-01-15/"));
        assert_eq!(layer.built_for_date(), Some(date(2024, 1, 15)));
        assert!(!map.attached.contains(&layer.tile_source().unwrap().id));

        registry.toggle(&mut map, &night, true);
        assert!(map.attached.contains(&registry.layer(&night).unwrap().tile_source().unwrap().id));
    }

    #[test]
    fn set_date_swaps_attached_source() {
        let (mut map, mut registry) = setup();
        let key = LayerKey::from(TEMPERATURE);
        let old_id = registry.layer(&key).unwrap().tile_source().unwrap().id;

        registry.set_date(&mut map, date(2024, 1, 20)).unwrap();

        let new_id = registry.layer(&key).unwrap().tile_source().unwrap().id;
        assert!(!map.attached.contains(&old_id));
        assert!(map.attached.contains(&new_id));
    }

    #[test]
    fn failing_layer_does_not_block_others() {
        let (mut map, mut registry) = setup();
        map.broken.insert(TEMPERATURE.to_string());
        let temperature = LayerKey::from(TEMPERATURE);
        let old_id = registry.layer(&temperature).unwrap().tile_source().unwrap().id;

        let report = registry.set_date(&mut map, date(2024, 5, 5)).unwrap();

        assert_eq!(report.failed, vec![temperature.clone()]);
        assert_eq!(report.rebuilt.len(), 2);
        let layer = registry.layer(&temperature).unwrap();
        assert_eq!(layer.tile_source().unwrap().id, old_id);
        assert_eq!(layer.built_for_date(), Some(date(2024, 1, 1)));
        assert!(layer.is_visible());
        assert!(map.attached.contains(&old_id));
        assert_eq!(
            registry.layer(&VEGETATION.into()).unwrap().built_for_date(),
            Some(date(2024, 5, 5))
        );
        assert_eq!(registry.current_date(), Some(date(2024, 5, 5)));
    }

    #[test]
    fn failing_layer_stays_pending_at_initialize() {
        let mut map = FakeMap::default();
        map.broken.insert(NIGHT_LIGHTS.to_string());
        let mut registry = LayerRegistry::new(TileUrlBuilder::default());

        let report = registry.initialize(&mut map, default_catalog(), date(2024, 1, 1));

        assert_eq!(report.failed, vec![LayerKey::from(NIGHT_LIGHTS)]);
        assert_eq!(registry.layers().len(), 3);
        let night = registry.layer(&NIGHT_LIGHTS.into()).unwrap();
        assert!(night.is_pending());
        assert_eq!(night.built_for_date(), None);
        assert!(!night.is_attached());
    }

    #[test]
    fn pending_layer_recovers_on_next_date() {
        let mut map = FakeMap::default();
        map.broken.insert(VEGETATION.to_string());
        let mut registry = LayerRegistry::new(TileUrlBuilder::default());
        registry.initialize(&mut map, default_catalog(), date(2024, 1, 1));
        let key = LayerKey::from(VEGETATION);

        let report = registry.set_date(&mut map, date(2024, 1, 2)).unwrap();
        assert_eq!(report.failed, vec![key.clone()]);
        assert!(registry.layer(&key).unwrap().is_pending());

        map.broken.clear();
        let report = registry.set_date(&mut map, date(2024, 2, 1)).unwrap();
        assert!(report.is_complete());
        assert!(report.rebuilt.contains(&key));

        let layer = registry.layer(&key).unwrap();
        assert!(!layer.is_pending());
        assert!(!layer.is_visible());
        assert_eq!(layer.built_for_date(), Some(date(2024, 2, 1)));

        assert!(registry.toggle(&mut map, &key, true));
        let id = registry.layer(&key).unwrap().tile_source().unwrap().id;
        assert!(map.attached.contains(&id));
    }

    #[test]
    fn pending_default_layer_is_attached_once_built() {
        let mut map = FakeMap::default();
        map.broken.insert(TEMPERATURE.to_string());
        let mut registry = LayerRegistry::new(TileUrlBuilder::default());
        registry.initialize(&mut map, default_catalog(), date(2024, 1, 1));
        let key = LayerKey::from(TEMPERATURE);
        assert!(registry.layer(&key).unwrap().is_visible());
        assert!(map.attached.is_empty());

        map.broken.clear();
        registry.set_date(&mut map, date(2024, 1, 3)).unwrap();

        let layer = registry.layer(&key).unwrap();
        assert!(layer.is_attached());
        assert!(map.attached.contains(&layer.tile_source().unwrap().id));
        assert_eq!(map.attached.len(), 1);
    }

    #[test]
    fn toggling_pending_layer_takes_effect_once_built() {
        let mut map = FakeMap::default();
        map.broken.insert(NIGHT_LIGHTS.to_string());
        let mut registry = LayerRegistry::new(TileUrlBuilder::default());
        registry.initialize(&mut map, default_catalog(), date(2024, 1, 1));
        let key = LayerKey::from(NIGHT_LIGHTS);

        assert!(registry.toggle(&mut map, &key, true));
        assert_eq!(map.attached.len(), 1);

        map.broken.clear();
        registry.set_date(&mut map, date(2024, 1, 2)).unwrap();
        assert!(registry.layer(&key).unwrap().is_attached());
        assert_eq!(map.attached.len(), 2);
    }

    #[test]
    fn toggle_unknown_key_is_noop() {
        let (mut map, mut registry) = setup();
        let before = visibility(&registry);
        assert!(!registry.toggle(&mut map, &"aerosol".into(), true));
        assert_eq!(visibility(&registry), before);
    }

    #[test]
    fn toggle_does_not_rebuild() {
        let (mut map, mut registry) = setup();
        let key = LayerKey::from(VEGETATION);
        let id = registry.layer(&key).unwrap().tile_source().unwrap().id;

        assert!(registry.toggle(&mut map, &key, true));
        assert!(!registry.toggle(&mut map, &key, true));
        assert!(registry.toggle(&mut map, &key, false));

        assert_eq!(registry.layer(&key).unwrap().tile_source().unwrap().id, id);
        assert!(!map.attached.contains(&id));
        assert_eq!(map.attach_calls, 2);
    }

    #[test]
    fn reinitialize_detaches_previous_layers() {
        let (mut map, mut registry) = setup();
        registry.initialize(&mut map, default_catalog(), date(2024, 6, 1));
        assert_eq!(map.attached.len(), 1);
        assert_eq!(registry.layers().len(), 3);
    }
}
