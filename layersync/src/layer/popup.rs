use geojson::{Feature, Value as GeometryValue};
use layersync_types::GeoPoint2d;
use serde_json::Value;

/// Content of the popup shown when a feature of an overlay is clicked.
///
/// The popup consists of a bold title taken from a feature property and a list of `Label: value`
/// rows. Properties that are missing, `null` or empty strings are skipped. All values are
/// HTML-escaped.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupTemplate {
    title_property: String,
    fallback_title: String,
    fields: Vec<PopupField>,
}

/// A row of the popup.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupField {
    /// Feature property the value is taken from.
    pub property: String,
    /// Label shown before the value.
    pub label: String,
}

impl PopupTemplate {
    /// Creates a template with the title taken from the `title_property`. If the feature does
    /// not have the property, `fallback_title` is used instead.
    pub fn new(title_property: impl Into<String>, fallback_title: impl Into<String>) -> Self {
        Self {
            title_property: title_property.into(),
            fallback_title: fallback_title.into(),
            fields: vec![],
        }
    }

    /// Adds a row.
    pub fn with_field(mut self, property: impl Into<String>, label: impl Into<String>) -> Self {
        self.fields.push(PopupField {
            property: property.into(),
            label: label.into(),
        });
        self
    }

    /// Rows of the popup.
    pub fn fields(&self) -> &[PopupField] {
        &self.fields
    }

    /// Renders HTML content of the popup for the feature.
    pub fn render(&self, feature: &Feature) -> String {
        let title = property_text(feature, &self.title_property)
            .unwrap_or_else(|| self.fallback_title.clone());

        let mut html = format!("<strong>{}</strong><br/>", escape_html(&title));
        for field in &self.fields {
            if let Some(value) = property_text(feature, &field.property) {
                html.push_str(&format!(
                    "{}: {}<br/>",
                    escape_html(&field.label),
                    escape_html(&value)
                ));
            }
        }

        html
    }
}

/// Position of a point feature. Returns `None` for other geometry types.
pub(crate) fn point_position(feature: &Feature) -> Option<GeoPoint2d> {
    match &feature.geometry.as_ref()?.value {
        GeometryValue::Point(position) if position.len() >= 2 => {
            Some(GeoPoint2d::lonlat(position[0], position[1]))
        }
        _ => None,
    }
}

fn property_text(feature: &Feature, name: &str) -> Option<String> {
    match feature.property(name)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use geojson::Geometry;
    use serde_json::json;

    use super::*;

    fn feature(properties: Value) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(GeometryValue::Point(vec![-122.41, 37.77]))),
            id: None,
            properties: properties.as_object().cloned(),
            foreign_members: None,
        }
    }

    fn incidents_template() -> PopupTemplate {
        PopupTemplate::new("incident_category", "Incident")
            .with_field("incident_datetime", "Date")
            .with_field("police_district", "District")
    }

    #[test]
    fn renders_title_and_present_fields() {
        let feature = feature(json!({
            "incident_category": "Larceny Theft",
            "incident_datetime": "2024-03-01T10:00:00",
            "police_district": ""
        }));

        assert_eq!(
            incidents_template().render(&feature),
            "<strong>Larceny Theft</strong><br/>Date: 2024-03-01T10:00:00<br/>"
        );
    }

    #[test]
    fn uses_fallback_title() {
        let feature = feature(json!({ "incident_category": null, "police_district": "MISSION" }));
        assert_eq!(
            incidents_template().render(&feature),
            "<strong>Incident</strong><br/>District: MISSION<br/>"
        );
    }

    #[test]
    fn escapes_values() {
        let feature = feature(json!({ "incident_category": "<script>\"x\" & y</script>" }));
        assert_eq!(
            incidents_template().render(&feature),
            "<strong>&lt;script&gt;&quot;x&quot; &amp; y&lt;/script&gt;</strong><br/>"
        );
    }

    #[test]
    fn formats_non_string_values() {
        let feature = feature(json!({ "incident_category": "Arson", "police_district": 7 }));
        assert!(incidents_template()
            .render(&feature)
            .ends_with("District: 7<br/>"));
    }

    #[test]
    fn point_position_reads_lonlat() {
        let position = point_position(&feature(json!({}))).expect("point geometry");
        assert_eq!(position, GeoPoint2d::latlon(37.77, -122.41));
    }
}
