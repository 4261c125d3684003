//! Events the rendering engine delivers to the controller.

use geojson::Feature;
use layersync_types::GeoPoint2d;

/// Map lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    /// The map finished its initial load.
    Load,
    /// A new style (basemap) finished loading. All sources and layers added before are gone.
    StyleLoaded,
    /// The viewport is changing (continuous, fired during drag and zoom animations).
    Move,
    /// The viewport stopped changing.
    MoveEnd,
}

/// Pointer events fired for a specific style layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Pointer entered a feature of the layer.
    Enter,
    /// Pointer left the features of the layer.
    Leave,
    /// A feature of the layer was clicked.
    Click,
}

/// Event subscription held with the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subscription {
    /// Map lifecycle event.
    Map(MapEventKind),
    /// Pointer event on a style layer.
    Layer {
        /// Pointer event type.
        kind: PointerEventKind,
        /// Style layer id.
        layer: String,
    },
}

/// Pointer event on a style layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// Event type.
    pub kind: PointerEventKind,
    /// Style layer the event was fired for.
    pub layer: String,
    /// Position of the pointer.
    pub position: GeoPoint2d,
    /// Topmost feature under the pointer, if the engine reports one.
    pub feature: Option<Feature>,
}

/// Event delivered by the rendering engine.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Lifecycle event.
    Map(MapEventKind),
    /// Pointer event on a layer.
    Pointer(PointerEvent),
}

impl From<MapEventKind> for MapEvent {
    fn from(value: MapEventKind) -> Self {
        Self::Map(value)
    }
}

impl From<PointerEvent> for MapEvent {
    fn from(value: PointerEvent) -> Self {
        Self::Pointer(value)
    }
}
