//! Overlay layers: named data sets drawn above the basemap, each bound to one remote provider.

use std::sync::Arc;

use serde_json::Value;

use crate::engine::{ImageData, LayerKind, LayerSpec, SourceData, SourceSpec, Visibility};
use crate::provider::ViewportProvider;
use crate::sync::DesiredVisualState;

mod popup;

pub(crate) use popup::point_position;
pub use popup::{PopupField, PopupTemplate};

/// Where the data of an overlay comes from.
#[derive(Debug, Clone)]
pub enum Endpoint {
    /// Fixed GeoJSON url. The engine loads it by itself once the source is created.
    Static(String),
    /// Provider whose request depends on the viewport. The data is refetched every time the
    /// viewport stops changing.
    Viewport(Arc<dyn ViewportProvider>),
}

/// Drawing style of an overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayStyle {
    /// Points drawn as circles.
    Circle(CircleStyle),
    /// Polygons drawn with fill and outline.
    Polygon(PolygonStyle),
    /// Georeferenced raster image.
    Raster,
}

/// Style of point overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleStyle {
    /// Circle radius in pixels.
    pub radius: f64,
    /// Fill color as a CSS color string.
    pub color: String,
    /// Width of the outline in pixels.
    pub stroke_width: f64,
    /// Outline color.
    pub stroke_color: String,
}

/// Style of polygon overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonStyle {
    /// Fill color of polygon interiors.
    pub fill_color: String,
    /// Outline color.
    pub line_color: String,
    /// Width of the outline in pixels.
    pub line_width: f64,
}

impl OverlayStyle {
    /// Suffixes and types of the style layers the overlay is drawn with, in draw order.
    fn parts(&self) -> &'static [(&'static str, LayerKind)] {
        match self {
            OverlayStyle::Circle(_) => &[("circle", LayerKind::Circle)],
            OverlayStyle::Polygon(_) => &[("fill", LayerKind::Fill), ("line", LayerKind::Line)],
            OverlayStyle::Raster => &[("raster", LayerKind::Raster)],
        }
    }

    fn paint(&self, kind: LayerKind) -> Vec<(&'static str, Value)> {
        match (self, kind) {
            (OverlayStyle::Circle(style), _) => vec![
                ("circle-radius", style.radius.into()),
                ("circle-color", style.color.clone().into()),
                ("circle-stroke-width", style.stroke_width.into()),
                ("circle-stroke-color", style.stroke_color.clone().into()),
            ],
            (OverlayStyle::Polygon(style), LayerKind::Fill) => {
                vec![("fill-color", style.fill_color.clone().into())]
            }
            (OverlayStyle::Polygon(style), _) => vec![
                ("line-color", style.line_color.clone().into()),
                ("line-width", style.line_width.into()),
            ],
            (OverlayStyle::Raster, _) => vec![("raster-fade-duration", 0.into())],
        }
    }
}

/// A named overlay bound to one remote provider.
///
/// The overlay is drawn with one or more style layers ("sub-layers") sharing a single source
/// named by the overlay id:
///
/// * circle overlays: `<id>-circle`
/// * polygon overlays: `<id>-fill` and `<id>-line`
/// * raster overlays: `<id>-raster`
///
/// ```
/// use layersync::layer::{CircleStyle, Endpoint, OverlayLayer, OverlayStyle};
///
/// let layer = OverlayLayer::new(
///     "incidents",
///     Endpoint::Static("https://example.com/incidents.geojson".into()),
///     OverlayStyle::Circle(CircleStyle {
///         radius: 4.0,
///         color: "#e11d48".into(),
///         stroke_width: 1.0,
///         stroke_color: "#ffffff".into(),
///     }),
/// )
/// .with_opacity(0.7);
///
/// assert_eq!(layer.sub_layer_ids(), ["incidents-circle"]);
/// ```
#[derive(Debug, Clone)]
pub struct OverlayLayer {
    id: String,
    title: Option<String>,
    endpoint: Endpoint,
    style: OverlayStyle,
    visible: bool,
    opacity: f32,
    popup: Option<PopupTemplate>,
}

impl OverlayLayer {
    /// Creates a new overlay. The overlay is initially visible with opacity `1.0`.
    pub fn new(id: impl Into<String>, endpoint: Endpoint, style: OverlayStyle) -> Self {
        Self {
            id: id.into(),
            title: None,
            endpoint,
            style,
            visible: true,
            opacity: 1.0,
            popup: None,
        }
    }

    /// Sets human readable name of the overlay.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets initial visibility.
    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets initial opacity. The value is clamped into `[0, 1]`, NaN is ignored.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        if !opacity.is_nan() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        self
    }

    /// Shows popups and pointer cursor for the features of the overlay.
    pub fn with_popup(mut self, popup: PopupTemplate) -> Self {
        self.popup = Some(popup);
        self
    }

    /// Unique identifier, also the id of the engine source.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human readable name, defaults to the id.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    /// Data endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Drawing style.
    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Popup template, if the overlay is interactive.
    pub fn popup(&self) -> Option<&PopupTemplate> {
        self.popup.as_ref()
    }

    /// Returns true if the overlay data depends on the viewport.
    pub fn is_viewport_dependent(&self) -> bool {
        matches!(self.endpoint, Endpoint::Viewport(_))
    }

    /// Provider of a viewport dependent overlay.
    pub fn provider(&self) -> Option<&Arc<dyn ViewportProvider>> {
        match &self.endpoint {
            Endpoint::Viewport(provider) => Some(provider),
            Endpoint::Static(_) => None,
        }
    }

    /// Visual state the overlay starts with.
    pub fn initial_state(&self) -> DesiredVisualState {
        DesiredVisualState::new(self.visible, self.opacity)
    }

    /// Ids of the style layers of the overlay in draw order.
    pub fn sub_layer_ids(&self) -> Vec<String> {
        self.style
            .parts()
            .iter()
            .map(|(suffix, _)| self.sub_layer_id(suffix))
            .collect()
    }

    /// Returns true if the style layer with the given id belongs to this overlay.
    pub fn owns_sub_layer(&self, layer_id: &str) -> bool {
        self.style
            .parts()
            .iter()
            .any(|(suffix, _)| layer_id == self.sub_layer_id(suffix))
    }

    /// Ids and types of the style layers of the overlay.
    pub fn sub_layer_kinds(&self) -> Vec<(String, LayerKind)> {
        self.style
            .parts()
            .iter()
            .map(|(suffix, kind)| (self.sub_layer_id(suffix), *kind))
            .collect()
    }

    /// Definitions of the style layers with the visibility and opacity of the given state.
    pub fn sub_layers(&self, state: &DesiredVisualState) -> Vec<LayerSpec> {
        self.style
            .parts()
            .iter()
            .map(|(suffix, kind)| {
                let mut spec = LayerSpec::new(self.sub_layer_id(suffix), *kind, &self.id)
                    .with_visibility(Visibility::from_visible(state.visible()));
                for (name, value) in self.style.paint(*kind) {
                    spec = spec.with_paint(name, value);
                }
                for name in kind.opacity_properties() {
                    spec = spec.with_paint(name, f64::from(state.opacity()));
                }
                spec
            })
            .collect()
    }

    /// Definition of the source to create for the overlay.
    ///
    /// Viewport dependent overlays start empty and get their data with the first fetch.
    pub fn source_spec(&self) -> SourceSpec {
        match (&self.endpoint, &self.style) {
            (Endpoint::Static(url), _) => SourceSpec::GeoJsonUrl(url.clone()),
            (Endpoint::Viewport(_), OverlayStyle::Raster) => SourceSpec::Image(ImageData::empty()),
            (Endpoint::Viewport(_), _) => SourceSpec::GeoJson(crate::engine::empty_collection()),
        }
    }

    /// Data that clears the source of the overlay.
    pub fn empty_data(&self) -> SourceData {
        match self.style {
            OverlayStyle::Raster => SourceData::Image(ImageData::empty()),
            _ => SourceData::empty_collection(),
        }
    }

    fn sub_layer_id(&self, suffix: &str) -> String {
        format!("{}-{suffix}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn polygon_layer() -> OverlayLayer {
        OverlayLayer::new(
            "law",
            Endpoint::Static("https://example.com/law.geojson".into()),
            OverlayStyle::Polygon(PolygonStyle {
                fill_color: "#aec7e8".into(),
                line_color: "#1f77b4".into(),
                line_width: 2.0,
            }),
        )
    }

    #[test]
    fn polygon_overlay_has_fill_and_line() {
        let layer = polygon_layer();
        assert_eq!(layer.sub_layer_ids(), ["law-fill", "law-line"]);
        assert!(layer.owns_sub_layer("law-line"));
        assert!(!layer.owns_sub_layer("law"));
        assert!(!layer.owns_sub_layer("lawn-fill"));
    }

    #[test]
    fn sub_layers_carry_desired_state() {
        let layer = polygon_layer();
        let specs = layer.sub_layers(&DesiredVisualState::new(false, 0.25));

        assert_eq!(specs.len(), 2);
        assert!(specs.iter().all(|spec| spec.source == "law"));
        assert!(specs
            .iter()
            .all(|spec| spec.visibility() == Visibility::None));
        assert_relative_eq!(specs[0].paint["fill-opacity"].as_f64().unwrap_or(0.0), 0.25);
        assert_relative_eq!(specs[1].paint["line-opacity"].as_f64().unwrap_or(0.0), 0.25);
        assert_eq!(specs[1].paint["line-width"], 2.0);
        assert!(specs[0].paint.get("line-opacity").is_none());
    }

    #[test]
    fn static_overlay_source_is_url() {
        assert_eq!(
            polygon_layer().source_spec(),
            SourceSpec::GeoJsonUrl("https://example.com/law.geojson".into())
        );
        assert!(!polygon_layer().is_viewport_dependent());
    }

    #[test]
    fn initial_opacity_is_clamped() {
        assert_relative_eq!(polygon_layer().with_opacity(3.0).initial_state().opacity(), 1.0);
        assert_relative_eq!(polygon_layer().with_opacity(-1.0).initial_state().opacity(), 0.0);
    }
}
