use geojson::{Feature, Geometry, Value as GeometryValue};
use serde_json::{Map, Value};

/// Describes how to turn a flat JSON record into a point feature.
///
/// Fields are addressed with JSON pointers (RFC 6901), e.g. `/location/latitude`. Coordinates may
/// be numbers or numeric strings. Records whose coordinates are missing, not numeric or out of
/// range don't produce a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    latitude: String,
    longitude: String,
    properties: Vec<(String, String)>,
}

impl RecordSchema {
    /// Creates a schema with the pointers to the coordinate fields.
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            properties: vec![],
        }
    }

    /// Copies the value at `pointer` into the feature property `name`.
    pub fn with_property(mut self, name: impl Into<String>, pointer: impl Into<String>) -> Self {
        self.properties.push((name.into(), pointer.into()));
        self
    }

    /// Converts the record into a point feature.
    pub fn to_feature(&self, record: &Value) -> Option<Feature> {
        let lat = coordinate(record, &self.latitude).filter(|lat| lat.abs() <= 90.0)?;
        let lon = coordinate(record, &self.longitude).filter(|lon| lon.abs() <= 180.0)?;

        let properties: Map<String, Value> = self
            .properties
            .iter()
            .filter_map(|(name, pointer)| {
                record
                    .pointer(pointer)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect();

        Some(Feature {
            bbox: None,
            geometry: Some(Geometry::new(GeometryValue::Point(vec![lon, lat]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        })
    }
}

fn coordinate(record: &Value, pointer: &str) -> Option<f64> {
    let value = match record.pointer(pointer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;

    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schema() -> RecordSchema {
        RecordSchema::new("/location/latitude", "/location/longitude")
            .with_property("category", "/category")
            .with_property("street", "/location/street/name")
    }

    #[test]
    fn reads_string_and_number_coordinates() {
        let from_strings = json!({"location": {"latitude": "52.63", "longitude": " -1.13"}});
        let from_numbers = json!({"location": {"latitude": 52.63, "longitude": -1.13}});

        for record in [from_strings, from_numbers] {
            let feature = schema().to_feature(&record).expect("valid record");
            assert_eq!(
                feature.geometry.map(|g| g.value),
                Some(GeometryValue::Point(vec![-1.13, 52.63]))
            );
        }
    }

    #[test]
    fn copies_present_properties() {
        let record = json!({
            "category": "burglary",
            "location": {"latitude": "1", "longitude": "2", "street": {"name": "High Street"}}
        });
        let feature = schema().to_feature(&record).expect("valid record");

        assert_eq!(feature.property("category"), Some(&json!("burglary")));
        assert_eq!(feature.property("street"), Some(&json!("High Street")));
    }

    #[test]
    fn rejects_bad_coordinates() {
        for record in [
            json!({"location": {"latitude": "", "longitude": "1"}}),
            json!({"location": {"latitude": "abc", "longitude": "1"}}),
            json!({"location": {"latitude": 91.0, "longitude": 1.0}}),
            json!({"location": {"latitude": true, "longitude": 1.0}}),
            json!({"location": null}),
            json!([]),
        ] {
            assert!(schema().to_feature(&record).is_none(), "{record}");
        }
    }
}
