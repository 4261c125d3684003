use std::collections::HashSet;
use std::sync::Arc;

use crate::basemap::BasemapConfig;
use crate::engine::MapEngine;
use crate::error::SyncError;
use crate::layer::{Endpoint, OverlayLayer, OverlayStyle};
use crate::platform::{HttpTransport, Transport};
use crate::sync::LayerSyncController;
use crate::ui::WidgetMap;

/// Convenience type to initialize a [`LayerSyncController`].
///
/// ```no_run
/// use layersync::{catalog, LayerSyncBuilder, MemoryEngine, Viewport};
/// use layersync::layersync_types::{GeoBounds, Size};
///
/// let engine = MemoryEngine::new(Viewport::new(
///     GeoBounds::new(-122.5, 37.7, -122.3, 37.8),
///     Size::new(1024, 768),
/// ));
///
/// let mut controller = LayerSyncBuilder::new(engine)
///     .with_overlays(catalog::overlays())
///     .with_basemap(catalog::osm_basemap())
///     .build()
///     .unwrap();
/// controller.attach();
/// ```
pub struct LayerSyncBuilder<E: MapEngine> {
    engine: E,
    transport: Option<Arc<dyn Transport>>,
    overlays: Vec<OverlayLayer>,
    basemap: Option<BasemapConfig>,
    widgets: Option<WidgetMap>,
}

impl<E: MapEngine> LayerSyncBuilder<E> {
    /// Creates a builder for a controller driving the given engine.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            transport: None,
            overlays: vec![],
            basemap: None,
            widgets: None,
        }
    }

    /// Adds an overlay. Overlays are drawn in the order they are added, the first one at the
    /// bottom.
    pub fn with_overlay(mut self, overlay: OverlayLayer) -> Self {
        self.overlays.push(overlay);
        self
    }

    /// Adds several overlays.
    pub fn with_overlays(mut self, overlays: impl IntoIterator<Item = OverlayLayer>) -> Self {
        self.overlays.extend(overlays);
        self
    }

    /// Sets the basemap configuration. Without it basemap selection events are ignored.
    pub fn with_basemap(mut self, basemap: BasemapConfig) -> Self {
        self.basemap = Some(basemap);
        self
    }

    /// Sets the transport used to load provider data.
    ///
    /// Defaults to [`HttpTransport`].
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the widget mapping.
    ///
    /// Defaults to [`WidgetMap::legend`] of all overlays.
    pub fn with_widgets(mut self, widgets: WidgetMap) -> Self {
        self.widgets = Some(widgets);
        self
    }

    /// Validates the overlays and creates the controller.
    ///
    /// Fails if two overlays have the same id, or if an overlay with a static url is styled as
    /// raster.
    pub fn build(self) -> Result<LayerSyncController<E>, SyncError> {
        let mut ids = HashSet::new();
        for overlay in &self.overlays {
            if !ids.insert(overlay.id()) {
                return Err(SyncError::InvalidOverlay(format!(
                    "overlay {} is declared more than once",
                    overlay.id()
                )));
            }

            if matches!(
                (overlay.endpoint(), overlay.style()),
                (Endpoint::Static(_), OverlayStyle::Raster)
            ) {
                return Err(SyncError::InvalidOverlay(format!(
                    "raster overlay {} must have a viewport provider",
                    overlay.id()
                )));
            }
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };
        let widgets = self
            .widgets
            .unwrap_or_else(|| WidgetMap::legend(self.overlays.iter().map(OverlayLayer::id)));

        Ok(LayerSyncController::new(
            self.engine,
            transport,
            self.overlays,
            self.basemap,
            widgets,
        ))
    }
}
