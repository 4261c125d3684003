//! Mapping of UI widgets to the overlays and basemaps they control.

use std::collections::HashMap;

use crate::basemap::BasemapChoice;

/// Discrete event produced by a UI widget.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Checkbox or radio button changed its state.
    Toggle {
        /// Widget id.
        widget: String,
        /// New state.
        checked: bool,
    },
    /// Slider moved.
    Slider {
        /// Widget id.
        widget: String,
        /// New value.
        value: f32,
    },
    /// Button pressed.
    Button {
        /// Widget id.
        widget: String,
    },
}

impl UiEvent {
    /// Id of the widget the event came from.
    pub fn widget(&self) -> &str {
        match self {
            UiEvent::Toggle { widget, .. }
            | UiEvent::Slider { widget, .. }
            | UiEvent::Button { widget } => widget,
        }
    }
}

/// What a widget controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetBinding {
    /// Visibility toggle of the overlay.
    Visibility(String),
    /// Opacity slider of the overlay.
    Opacity(String),
    /// Basemap selector.
    Basemap(BasemapChoice),
}

/// Explicit mapping from widget ids to what they control.
///
/// ```
/// use layersync::ui::{WidgetBinding, WidgetMap};
///
/// let widgets = WidgetMap::legend(["law", "fire"]);
/// assert_eq!(
///     widgets.binding("opacity-fire"),
///     Some(&WidgetBinding::Opacity("fire".into()))
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetMap {
    bindings: HashMap<String, WidgetBinding>,
}

impl WidgetMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map with a `toggle-<id>` checkbox and an `opacity-<id>` slider for each overlay.
    pub fn legend<S: AsRef<str>>(overlay_ids: impl IntoIterator<Item = S>) -> Self {
        overlay_ids
            .into_iter()
            .fold(Self::new(), |widgets, id| {
                let id = id.as_ref();
                widgets.with_overlay(id, format!("toggle-{id}"), Some(format!("opacity-{id}")))
            })
    }

    /// Binds the visibility widget and, optionally, the opacity widget of the overlay.
    pub fn with_overlay(
        mut self,
        overlay_id: &str,
        visibility_widget: impl Into<String>,
        opacity_widget: Option<String>,
    ) -> Self {
        self.bind(
            visibility_widget.into(),
            WidgetBinding::Visibility(overlay_id.to_owned()),
        );
        if let Some(widget) = opacity_widget {
            self.bind(widget, WidgetBinding::Opacity(overlay_id.to_owned()));
        }
        self
    }

    /// Binds a widget selecting the basemap.
    pub fn with_basemap_widget(mut self, widget: impl Into<String>, choice: BasemapChoice) -> Self {
        self.bind(widget.into(), WidgetBinding::Basemap(choice));
        self
    }

    /// What the widget controls.
    pub fn binding(&self, widget: &str) -> Option<&WidgetBinding> {
        self.bindings.get(widget)
    }

    /// Number of bound widgets.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no widgets are bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn bind(&mut self, widget: String, binding: WidgetBinding) {
        if let Some(previous) = self.bindings.insert(widget.clone(), binding) {
            log::debug!("Widget {widget} was bound to {previous:?}, rebinding");
        }
    }
}
