use std::collections::HashMap;

use serde_json::Value;

use super::{Cursor, LayerSpec, MapEngine, Popup, SourceData, SourceSpec, Viewport};
use crate::error::SyncError;
use crate::event::Subscription;

/// In-process [`MapEngine`] that keeps sources and layers in memory without drawing anything.
///
/// Useful for headless runs of the controller and for testing applications built on it. Besides
/// the engine interface it exposes the stored state and the number of registration calls it
/// received, and can simulate a style reload with [`MemoryEngine::reload_style`].
#[derive(Debug)]
pub struct MemoryEngine {
    style_sources: Vec<(String, SourceSpec)>,
    style_layers: Vec<LayerSpec>,
    sources: HashMap<String, MemorySource>,
    layers: Vec<LayerSpec>,
    viewport: Viewport,
    style_loaded: bool,
    subscriptions: Vec<Subscription>,
    cursor: Cursor,
    popups: Vec<Popup>,
    source_additions: usize,
    layer_additions: usize,
}

#[derive(Debug)]
struct MemorySource {
    spec: SourceSpec,
    data: Option<SourceData>,
    updates: usize,
}

impl MemoryEngine {
    /// Creates an engine with an empty, loaded style.
    pub fn new(viewport: Viewport) -> Self {
        Self::with_style(viewport, vec![], vec![])
    }

    /// Creates an engine whose style consists of the given sources and layers. They are restored
    /// on every [`MemoryEngine::reload_style`] call.
    pub fn with_style(
        viewport: Viewport,
        style_sources: Vec<(String, SourceSpec)>,
        style_layers: Vec<LayerSpec>,
    ) -> Self {
        let mut engine = Self {
            style_sources,
            style_layers,
            sources: HashMap::new(),
            layers: vec![],
            viewport,
            style_loaded: true,
            subscriptions: vec![],
            cursor: Cursor::Default,
            popups: vec![],
            source_additions: 0,
            layer_additions: 0,
        };
        engine.reset_to_style();
        engine
    }

    /// Replaces everything added to the engine with the content of the style, as a web map engine
    /// does when its style is changed. Subscriptions survive the reload.
    pub fn reload_style(&mut self) {
        self.reset_to_style();
        self.style_loaded = true;
    }

    /// Sets the flag returned by [`MapEngine::is_style_loaded`].
    pub fn set_style_loaded(&mut self, loaded: bool) {
        self.style_loaded = loaded;
    }

    /// Changes the current viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Definition of the source.
    pub fn source(&self, id: &str) -> Option<&SourceSpec> {
        self.sources.get(id).map(|source| &source.spec)
    }

    /// Current data of the source. For sources created with inline data and never updated,
    /// returns the initial data. Sources loading their data by url have no data.
    pub fn source_data(&self, id: &str) -> Option<SourceData> {
        let source = self.sources.get(id)?;
        if let Some(data) = &source.data {
            return Some(data.clone());
        }

        match &source.spec {
            SourceSpec::GeoJson(collection) => Some(SourceData::GeoJson(collection.clone())),
            SourceSpec::Image(image) => Some(SourceData::Image(image.clone())),
            SourceSpec::GeoJsonUrl(_) | SourceSpec::RasterTiles { .. } => None,
        }
    }

    /// Number of times the data of the source was replaced.
    pub fn data_updates(&self, id: &str) -> usize {
        self.sources.get(id).map(|source| source.updates).unwrap_or(0)
    }

    /// Definition of the layer with all property changes applied.
    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Total number of `add_source` calls that succeeded.
    pub fn source_additions(&self) -> usize {
        self.source_additions
    }

    /// Total number of `add_layer` calls that succeeded.
    pub fn layer_additions(&self) -> usize {
        self.layer_additions
    }

    /// Subscriptions in the order they were made.
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Current cursor.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// All popups shown so far.
    pub fn popups(&self) -> &[Popup] {
        &self.popups
    }

    fn reset_to_style(&mut self) {
        self.sources = self
            .style_sources
            .iter()
            .map(|(id, spec)| {
                (
                    id.clone(),
                    MemorySource {
                        spec: spec.clone(),
                        data: None,
                        updates: 0,
                    },
                )
            })
            .collect();
        self.layers = self.style_layers.clone();
    }

    fn layer_position(&self, id: &str) -> Result<usize, SyncError> {
        self.layers
            .iter()
            .position(|layer| layer.id == id)
            .ok_or_else(|| SyncError::Engine(format!("layer {id} does not exist")))
    }

    fn layer_mut(&mut self, id: &str) -> Result<&mut LayerSpec, SyncError> {
        let index = self.layer_position(id)?;
        Ok(&mut self.layers[index])
    }

    fn insert_position(&self, before: Option<&str>) -> Result<usize, SyncError> {
        match before {
            Some(before) => self.layer_position(before),
            None => Ok(self.layers.len()),
        }
    }
}

impl MapEngine for MemoryEngine {
    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<(), SyncError> {
        if !self.style_loaded {
            return Err(SyncError::Engine("style is not done loading".into()));
        }

        if self.sources.contains_key(id) {
            return Err(SyncError::Engine(format!("source {id} already exists")));
        }

        self.sources.insert(
            id.to_owned(),
            MemorySource {
                spec: source,
                data: None,
                updates: 0,
            },
        );
        self.source_additions += 1;
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: SourceData) -> Result<(), SyncError> {
        let source = self
            .sources
            .get_mut(id)
            .ok_or_else(|| SyncError::Engine(format!("source {id} does not exist")))?;

        source.data = Some(data);
        source.updates += 1;
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|layer| layer.id == id)
    }

    fn add_layer(&mut self, layer: LayerSpec, before: Option<&str>) -> Result<(), SyncError> {
        if self.has_layer(&layer.id) {
            return Err(SyncError::Engine(format!(
                "layer {} already exists",
                layer.id
            )));
        }

        if !self.sources.contains_key(&layer.source) {
            return Err(SyncError::Engine(format!(
                "source {} for layer {} does not exist",
                layer.source, layer.id
            )));
        }

        let index = self.insert_position(before)?;
        self.layers.insert(index, layer);
        self.layer_additions += 1;
        Ok(())
    }

    fn move_layer(&mut self, id: &str, before: Option<&str>) -> Result<(), SyncError> {
        if before == Some(id) {
            return Ok(());
        }

        let index = self.layer_position(id)?;
        let layer = self.layers.remove(index);
        match self.insert_position(before) {
            Ok(index) => {
                self.layers.insert(index, layer);
                Ok(())
            }
            Err(err) => {
                self.layers.push(layer);
                Err(err)
            }
        }
    }

    fn layer_ids(&self) -> Vec<String> {
        self.layers.iter().map(|layer| layer.id.clone()).collect()
    }

    fn set_layout_property(
        &mut self,
        layer: &str,
        name: &str,
        value: Value,
    ) -> Result<(), SyncError> {
        self.layer_mut(layer)?.layout.insert(name.to_owned(), value);
        Ok(())
    }

    fn set_paint_property(
        &mut self,
        layer: &str,
        name: &str,
        value: Value,
    ) -> Result<(), SyncError> {
        self.layer_mut(layer)?.paint.insert(name.to_owned(), value);
        Ok(())
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn is_style_loaded(&self) -> bool {
        self.style_loaded
    }

    fn subscribe(&mut self, subscription: &Subscription) {
        self.subscriptions.push(subscription.clone());
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn show_popup(&mut self, popup: Popup) {
        self.popups.push(popup);
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use layersync_types::{GeoBounds, Size};

    use super::*;
    use crate::engine::{empty_collection, LayerKind};

    fn viewport() -> Viewport {
        Viewport::new(GeoBounds::new(-1.0, -1.0, 1.0, 1.0), Size::new(800, 600))
    }

    fn engine_with_source() -> MemoryEngine {
        let mut engine = MemoryEngine::new(viewport());
        engine
            .add_source("a", SourceSpec::GeoJson(empty_collection()))
            .expect("source added");
        engine
    }

    #[test]
    fn rejects_duplicates() {
        let mut engine = engine_with_source();
        assert_matches!(
            engine.add_source("a", SourceSpec::GeoJsonUrl("x".into())),
            Err(SyncError::Engine(_))
        );

        let layer = LayerSpec::new("a-circle", LayerKind::Circle, "a");
        engine.add_layer(layer.clone(), None).expect("layer added");
        assert_matches!(engine.add_layer(layer, None), Err(SyncError::Engine(_)));
        assert_eq!(engine.layer_additions(), 1);
    }

    #[test]
    fn inserts_before_and_moves_layers() {
        let mut engine = engine_with_source();
        for id in ["one", "two", "three"] {
            engine
                .add_layer(LayerSpec::new(id, LayerKind::Circle, "a"), None)
                .expect("layer added");
        }

        engine
            .add_layer(LayerSpec::new("under", LayerKind::Raster, "a"), Some("one"))
            .expect("layer inserted");
        assert_eq!(engine.layer_ids(), ["under", "one", "two", "three"]);

        engine.move_layer("under", Some("three")).expect("moved");
        assert_eq!(engine.layer_ids(), ["one", "two", "under", "three"]);

        engine.move_layer("one", None).expect("moved");
        assert_eq!(engine.layer_ids(), ["two", "under", "three", "one"]);
    }

    #[test]
    fn reload_restores_style() {
        let style_layer = LayerSpec::new("water", LayerKind::Fill, "basemap");
        let mut engine = MemoryEngine::with_style(
            viewport(),
            vec![("basemap".into(), SourceSpec::GeoJsonUrl("tiles".into()))],
            vec![style_layer],
        );
        engine
            .add_source("a", SourceSpec::GeoJsonUrl("x".into()))
            .expect("source added");
        engine
            .add_layer(LayerSpec::new("a-circle", LayerKind::Circle, "a"), None)
            .expect("layer added");

        engine.reload_style();

        assert!(!engine.has_source("a"));
        assert!(engine.has_source("basemap"));
        assert_eq!(engine.layer_ids(), ["water"]);
    }

    #[test]
    fn refuses_sources_before_style_is_loaded() {
        let mut engine = MemoryEngine::new(viewport());
        engine.set_style_loaded(false);
        assert!(engine
            .add_source("a", SourceSpec::GeoJsonUrl("x".into()))
            .is_err());
    }
}
