use bytes::Bytes;
use geojson::{FeatureCollection, GeoJson};
use layersync_types::Crs;
use serde_json::json;

use super::{parse_base_url, ProviderRequest, ViewportProvider};
use crate::engine::{SourceData, Viewport};
use crate::error::SyncError;

/// ArcGIS feature service `query` operation with the viewport passed as an envelope geometry.
///
/// The envelope is given in geographic coordinates (`inSR=4326`) and the service is asked to
/// respond with GeoJSON. Features the service sends without geometry are dropped.
#[derive(Debug, Clone)]
pub struct EnvelopeQueryProvider {
    base_url: String,
    out_fields: String,
    filter: String,
}

impl EnvelopeQueryProvider {
    /// Creates a provider for the `.../FeatureServer/<n>/query` url. All fields of the features
    /// are requested.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            out_fields: "*".into(),
            filter: "1=1".into(),
        }
    }

    /// Requests only the given attribute fields.
    pub fn with_out_fields<S: AsRef<str>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.out_fields = fields
            .into_iter()
            .map(|field| field.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(",");
        self
    }

    /// Sets the `where` clause of the query.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }
}

impl ViewportProvider for EnvelopeQueryProvider {
    fn build_request(&self, viewport: &Viewport) -> Result<ProviderRequest, SyncError> {
        let bounds = &viewport.bounds;
        bounds.validate()?;

        let envelope = json!({
            "xmin": bounds.west(),
            "ymin": bounds.south(),
            "xmax": bounds.east(),
            "ymax": bounds.north(),
            "spatialReference": { "wkid": Crs::EPSG4326.wkid() },
        });
        let srid = Crs::EPSG4326.wkid().to_string();

        let mut url = parse_base_url(&self.base_url)?;
        url.query_pairs_mut()
            .append_pair("geometry", &envelope.to_string())
            .append_pair("geometryType", "esriGeometryEnvelope")
            .append_pair("inSR", &srid)
            .append_pair("spatialRel", "esriSpatialRelIntersects")
            .append_pair("outFields", &self.out_fields)
            .append_pair("where", &self.filter)
            .append_pair("f", "geojson");

        Ok(ProviderRequest::new(url, viewport))
    }

    fn decode(&self, bytes: Bytes, _request: &ProviderRequest) -> Result<SourceData, SyncError> {
        let geojson: GeoJson = serde_json::from_slice(&bytes)?;
        let mut collection = FeatureCollection::try_from(geojson)?;

        let total = collection.features.len();
        collection
            .features
            .retain(|feature| feature.geometry.is_some());
        if collection.features.len() < total {
            log::debug!(
                "Skipped {} of {total} features without geometry",
                total - collection.features.len()
            );
        }

        Ok(SourceData::GeoJson(collection))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use layersync_types::{GeoBounds, Size};
    use serde_json::Value;

    use super::*;

    fn provider() -> EnvelopeQueryProvider {
        EnvelopeQueryProvider::new(
            "https://services.arcgis.com/org/arcgis/rest/services/Addresses/FeatureServer/0/query",
        )
        .with_out_fields(["ADDRESS", "CITY"])
    }

    fn request() -> ProviderRequest {
        let viewport = Viewport::new(
            GeoBounds::new(-122.1, 37.9, -122.0, 38.0),
            Size::new(800, 600),
        );
        provider().build_request(&viewport).expect("valid viewport")
    }

    #[test]
    fn request_contains_envelope_query() {
        let params: HashMap<_, _> = request().url.query_pairs().into_owned().collect();

        let geometry: Value = serde_json::from_str(&params["geometry"]).expect("json envelope");
        assert_eq!(geometry["xmin"], -122.1);
        assert_eq!(geometry["ymin"], 37.9);
        assert_eq!(geometry["xmax"], -122.0);
        assert_eq!(geometry["ymax"], 38.0);
        assert_eq!(geometry["spatialReference"]["wkid"], 4326);

        assert_eq!(params["geometryType"], "esriGeometryEnvelope");
        assert_eq!(params["inSR"], "4326");
        assert_eq!(params["spatialRel"], "esriSpatialRelIntersects");
        assert_eq!(params["outFields"], "ADDRESS,CITY");
        assert_eq!(params["where"], "1=1");
        assert_eq!(params["f"], "geojson");
    }

    #[test]
    fn features_without_geometry_are_dropped() {
        let body = br#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-122.05, 37.95]}, "properties": {"ADDRESS": "1 Main St"}},
                {"type": "Feature", "geometry": null, "properties": {"ADDRESS": "unknown"}}
            ]
        }"#;

        let data = provider()
            .decode(Bytes::from_static(body), &request())
            .expect("decoded");
        assert_eq!(data.feature_count(), Some(1));
    }

    #[test]
    fn service_error_is_a_decoding_error() {
        let body = br#"{"error": {"code": 400, "message": "Invalid query parameters"}}"#;
        assert_matches!(
            provider().decode(Bytes::from_static(body), &request()),
            Err(SyncError::Decoding(_))
        );
    }
}
