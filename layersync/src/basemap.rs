//! Switching between the vector and raster basemaps.

use crate::engine::{LayerKind, LayerSpec, SourceSpec, Visibility};

/// Basemap group shown under the overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BasemapChoice {
    /// Layers of the vector style.
    #[default]
    Vector,
    /// Raster tile layer.
    Raster,
}

/// Raster tile basemap added on top of the engine style.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterBasemap {
    /// Id of the tile source.
    pub source_id: String,
    /// Id of the raster style layer.
    pub layer_id: String,
    /// Tile url templates.
    pub tiles: Vec<String>,
    /// Tile size in pixels.
    pub tile_size: u32,
    /// Attribution text.
    pub attribution: Option<String>,
    /// Minimum zoom level tiles are shown at.
    pub min_zoom: f64,
    /// Maximum zoom level tiles are shown at.
    pub max_zoom: f64,
}

impl RasterBasemap {
    pub(crate) fn source_spec(&self) -> SourceSpec {
        SourceSpec::RasterTiles {
            tiles: self.tiles.clone(),
            tile_size: self.tile_size,
            attribution: self.attribution.clone(),
        }
    }

    pub(crate) fn layer_spec(&self, visible: bool) -> LayerSpec {
        LayerSpec::new(&self.layer_id, LayerKind::Raster, &self.source_id)
            .with_zoom_range(self.min_zoom, self.max_zoom)
            .with_visibility(Visibility::from_visible(visible))
    }
}

/// Both basemap groups and the one shown initially.
///
/// Vector layers are part of the engine style, so only their ids are needed. The raster basemap
/// is registered by the controller if the style doesn't contain it.
#[derive(Debug, Clone, PartialEq)]
pub struct BasemapConfig {
    /// Ids of the vector style layers.
    pub vector_layers: Vec<String>,
    /// Raster basemap definition.
    pub raster: RasterBasemap,
    /// Group shown on start.
    pub initial: BasemapChoice,
}

impl BasemapConfig {
    /// Creates a configuration showing the raster basemap initially.
    pub fn new(raster: RasterBasemap) -> Self {
        Self {
            vector_layers: vec![],
            raster,
            initial: BasemapChoice::Raster,
        }
    }

    /// Sets the vector style layers.
    pub fn with_vector_layers<S: Into<String>>(
        mut self,
        layers: impl IntoIterator<Item = S>,
    ) -> Self {
        self.vector_layers = layers.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the group shown on start.
    pub fn with_initial(mut self, initial: BasemapChoice) -> Self {
        self.initial = initial;
        self
    }
}
