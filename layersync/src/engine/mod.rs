//! Interface of the web map engine the controller drives.
//!
//! The engine owns sources (named data sets) and style layers (named visual representations of a
//! source). It draws layers in their insertion order, so a layer added later is drawn above the
//! ones added before it, unless it was inserted `before` a specific layer.
//!
//! The shapes of [`SourceSpec`] and [`LayerSpec`] follow the MapLibre style specification, so an
//! adapter for a JS engine can forward [`LayerSpec::to_style_json`] as is.

use bytes::Bytes;
use geojson::FeatureCollection;
use layersync_types::{GeoBounds, GeoPoint2d, Size};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::SyncError;
use crate::event::Subscription;

mod memory;

pub use memory::MemoryEngine;

/// Rendering engine operations used by the [`LayerSyncController`](crate::LayerSyncController).
///
/// All methods are called from a single thread. Mutating methods are only called for sources and
/// layers the controller has checked to exist, so implementations may treat a missing target as
/// an error.
pub trait MapEngine {
    /// Returns true if a source with the given id is registered.
    fn has_source(&self, id: &str) -> bool;
    /// Registers a new source.
    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<(), SyncError>;
    /// Replaces the data of an existing source.
    fn set_source_data(&mut self, id: &str, data: SourceData) -> Result<(), SyncError>;
    /// Returns true if a style layer with the given id is registered.
    fn has_layer(&self, id: &str) -> bool;
    /// Registers a new style layer. If `before` is given, the layer is inserted right beneath it,
    /// otherwise on top of all other layers.
    fn add_layer(&mut self, layer: LayerSpec, before: Option<&str>) -> Result<(), SyncError>;
    /// Moves an existing layer right beneath `before`, or to the top if `before` is `None`.
    fn move_layer(&mut self, id: &str, before: Option<&str>) -> Result<(), SyncError>;
    /// Ids of all registered layers in draw order, bottom first.
    fn layer_ids(&self) -> Vec<String>;
    /// Sets a layout property (e.g. `visibility`) of a layer.
    fn set_layout_property(&mut self, layer: &str, name: &str, value: Value)
        -> Result<(), SyncError>;
    /// Sets a paint property (e.g. `fill-opacity`) of a layer.
    fn set_paint_property(&mut self, layer: &str, name: &str, value: Value)
        -> Result<(), SyncError>;
    /// Currently displayed part of the map.
    fn viewport(&self) -> Viewport;
    /// Returns true once the current style finished loading and sources can be added.
    fn is_style_loaded(&self) -> bool;
    /// Starts delivering the events described by the subscription.
    fn subscribe(&mut self, subscription: &Subscription);
    /// Changes the cursor shown over the map.
    fn set_cursor(&mut self, cursor: Cursor);
    /// Opens a popup.
    fn show_popup(&mut self, popup: Popup);
}

/// Visible part of the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Geographic bounds of the visible area.
    pub bounds: GeoBounds,
    /// Size of the map canvas in pixels.
    pub size: Size,
}

impl Viewport {
    /// Creates a new viewport.
    pub fn new(bounds: GeoBounds, size: Size) -> Self {
        Self { bounds, size }
    }

    /// Same viewport with the longitudes of world copies brought into the degree range. See
    /// [`GeoBounds::normalized`].
    pub fn normalized(&self) -> Self {
        Self {
            bounds: self.bounds.normalized(),
            size: self.size,
        }
    }
}

/// Definition of a new source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    /// GeoJSON source the engine loads from the url by itself.
    GeoJsonUrl(String),
    /// GeoJSON source with inline data.
    GeoJson(FeatureCollection),
    /// Single georeferenced image.
    Image(ImageData),
    /// Raster tile source.
    RasterTiles {
        /// Tile url templates with `{z}`, `{x}` and `{y}` placeholders.
        tiles: Vec<String>,
        /// Size of a tile in pixels.
        tile_size: u32,
        /// Attribution text shown by the engine.
        attribution: Option<String>,
    },
}

/// Data replacing the content of an existing source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceData {
    /// Features for a GeoJSON source.
    GeoJson(FeatureCollection),
    /// Image for an image source.
    Image(ImageData),
}

impl SourceData {
    /// Empty feature collection.
    pub fn empty_collection() -> Self {
        Self::GeoJson(empty_collection())
    }

    /// Returns true if the data contains nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            SourceData::GeoJson(collection) => collection.features.is_empty(),
            SourceData::Image(image) => image.is_empty(),
        }
    }

    /// Number of features, or `None` for image data.
    pub fn feature_count(&self) -> Option<usize> {
        match self {
            SourceData::GeoJson(collection) => Some(collection.features.len()),
            SourceData::Image(_) => None,
        }
    }
}

/// Encoded raster image placed on the map by its corners.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Encoded image (PNG, JPEG).
    pub bytes: Bytes,
    /// `[lon, lat]` of the top-left, top-right, bottom-right and bottom-left corners.
    pub coordinates: [[f64; 2]; 4],
}

impl ImageData {
    /// Creates image data covering the given bounds.
    pub fn new(bytes: Bytes, bounds: &GeoBounds) -> Self {
        Self {
            bytes,
            coordinates: image_coordinates(bounds),
        }
    }

    /// Placeholder with no image content.
    pub fn empty() -> Self {
        Self {
            bytes: Bytes::new(),
            coordinates: [[0.0; 2]; 4],
        }
    }

    /// Returns true if there is no image content.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Corner coordinates of an image source covering `bounds`, in the order the engine expects.
pub fn image_coordinates(bounds: &GeoBounds) -> [[f64; 2]; 4] {
    [
        bounds.north_west().to_lonlat_array(),
        bounds.north_east().to_lonlat_array(),
        bounds.south_east().to_lonlat_array(),
        bounds.south_west().to_lonlat_array(),
    ]
}

/// Empty feature collection.
pub fn empty_collection() -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: vec![],
        foreign_members: None,
    }
}

/// Type of a style layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Points drawn as circles.
    Circle,
    /// Polygon interiors.
    Fill,
    /// Lines and polygon outlines.
    Line,
    /// Raster image or tiles.
    Raster,
}

impl LayerKind {
    /// Paint properties controlling the opacity of the layer. Setting all of them to the same
    /// value changes opacity of everything the layer draws.
    pub fn opacity_properties(&self) -> &'static [&'static str] {
        match self {
            LayerKind::Circle => &["circle-opacity", "circle-stroke-opacity"],
            LayerKind::Fill => &["fill-opacity"],
            LayerKind::Line => &["line-opacity"],
            LayerKind::Raster => &["raster-opacity"],
        }
    }
}

/// Value of the `visibility` layout property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Layer is drawn.
    Visible,
    /// Layer is not drawn.
    None,
}

impl Visibility {
    /// Name of the layout property.
    pub const PROPERTY: &'static str = "visibility";

    /// Converts a boolean flag.
    pub fn from_visible(visible: bool) -> Self {
        if visible {
            Self::Visible
        } else {
            Self::None
        }
    }

    /// Value of the property as JSON.
    pub fn to_value(self) -> Value {
        match self {
            Visibility::Visible => Value::from("visible"),
            Visibility::None => Value::from("none"),
        }
    }
}

/// Definition of a style layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    /// Unique id of the layer.
    pub id: String,
    /// Type of the layer.
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Id of the source the layer draws.
    pub source: String,
    /// Paint properties.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub paint: Map<String, Value>,
    /// Layout properties.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub layout: Map<String, Value>,
    /// Minimum zoom level the layer is drawn at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<f64>,
    /// Maximum zoom level the layer is drawn at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxzoom: Option<f64>,
}

impl LayerSpec {
    /// Creates a layer spec without any properties.
    pub fn new(id: impl Into<String>, kind: LayerKind, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            source: source.into(),
            paint: Map::new(),
            layout: Map::new(),
            minzoom: None,
            maxzoom: None,
        }
    }

    /// Adds a paint property.
    pub fn with_paint(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.paint.insert(name.to_owned(), value.into());
        self
    }

    /// Sets the `visibility` layout property.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.layout
            .insert(Visibility::PROPERTY.to_owned(), visibility.to_value());
        self
    }

    /// Sets the zoom range of the layer.
    pub fn with_zoom_range(mut self, minzoom: f64, maxzoom: f64) -> Self {
        self.minzoom = Some(minzoom);
        self.maxzoom = Some(maxzoom);
        self
    }

    /// Current value of the `visibility` layout property. Layers are visible by default.
    pub fn visibility(&self) -> Visibility {
        match self.layout.get(Visibility::PROPERTY).and_then(Value::as_str) {
            Some("none") => Visibility::None,
            _ => Visibility::Visible,
        }
    }

    /// Style layer JSON object.
    pub fn to_style_json(&self) -> Result<Value, SyncError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Cursor shown over the map canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Default engine cursor.
    #[default]
    Default,
    /// Pointing hand, shown over interactive features.
    Pointer,
}

/// Popup attached to a map position.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    /// Position of the popup anchor.
    pub position: GeoPoint2d,
    /// HTML content of the popup.
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_spec_serializes_to_style_json() {
        let spec = LayerSpec::new("law-fill", LayerKind::Fill, "law")
            .with_paint("fill-color", "#aec7e8")
            .with_paint("fill-opacity", 0.5)
            .with_visibility(Visibility::None);

        let json = spec.to_style_json().unwrap();
        assert_eq!(json["id"], "law-fill");
        assert_eq!(json["type"], "fill");
        assert_eq!(json["source"], "law");
        assert_eq!(json["paint"]["fill-opacity"], 0.5);
        assert_eq!(json["layout"]["visibility"], "none");
        assert!(json.get("minzoom").is_none());
    }

    #[test]
    fn visibility_defaults_to_visible() {
        let spec = LayerSpec::new("a", LayerKind::Circle, "a");
        assert_eq!(spec.visibility(), Visibility::Visible);
        assert_eq!(
            spec.with_visibility(Visibility::None).visibility(),
            Visibility::None
        );
    }

    #[test]
    fn image_coordinates_start_top_left() {
        let bounds = GeoBounds::new(-122.5, 37.7, -122.3, 37.8);
        assert_eq!(
            image_coordinates(&bounds),
            [
                [-122.5, 37.8],
                [-122.3, 37.8],
                [-122.3, 37.7],
                [-122.5, 37.7]
            ]
        );
    }
}
