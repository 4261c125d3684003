use bytes::Bytes;
use geojson::FeatureCollection;
use layersync_types::GeoPoint;

use super::{parse_base_url, ProviderRequest, RecordSchema, ViewportProvider};
use crate::engine::{SourceData, Viewport};
use crate::error::SyncError;

/// Service taking the area of interest as a polygon of `lat,lng` pairs and responding with a flat
/// list of JSON records, like the street-level crime API of `data.police.uk`.
///
/// The polygon is passed in the `poly` query parameter as the viewport corners in the order
/// south-west, north-west, north-east, south-east:
///
/// ```text
/// poly=37.700000,-122.500000:37.800000,-122.500000:37.800000,-122.300000:37.700000,-122.300000
/// ```
///
/// Records are converted into point features by the [`RecordSchema`].
#[derive(Debug, Clone)]
pub struct PolygonQueryProvider {
    base_url: String,
    schema: RecordSchema,
}

impl PolygonQueryProvider {
    /// Name of the query parameter the polygon is passed in.
    pub const POLYGON_PARAMETER: &'static str = "poly";

    /// Creates a new provider. Query parameters present in `base_url` are kept.
    pub fn new(base_url: impl Into<String>, schema: RecordSchema) -> Self {
        Self {
            base_url: base_url.into(),
            schema,
        }
    }

    /// Schema used to read the records.
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }
}

impl ViewportProvider for PolygonQueryProvider {
    fn build_request(&self, viewport: &Viewport) -> Result<ProviderRequest, SyncError> {
        viewport.bounds.validate()?;

        let polygon = viewport
            .bounds
            .corners()
            .iter()
            .map(|corner| format!("{:.6},{:.6}", corner.lat(), corner.lon()))
            .collect::<Vec<_>>()
            .join(":");

        let mut url = parse_base_url(&self.base_url)?;
        url.query_pairs_mut()
            .append_pair(Self::POLYGON_PARAMETER, &polygon);

        Ok(ProviderRequest::new(url, viewport))
    }

    fn decode(&self, bytes: Bytes, _request: &ProviderRequest) -> Result<SourceData, SyncError> {
        let records: Vec<serde_json::Value> = serde_json::from_slice(&bytes)?;
        let total = records.len();
        let features: Vec<_> = records
            .iter()
            .filter_map(|record| self.schema.to_feature(record))
            .collect();

        if features.len() < total {
            log::debug!(
                "Skipped {} of {total} records without valid coordinates",
                total - features.len()
            );
        }

        Ok(SourceData::GeoJson(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use layersync_types::{GeoBounds, Size};

    use super::*;

    fn provider() -> PolygonQueryProvider {
        PolygonQueryProvider::new(
            "https://data.police.uk/api/crimes-street/all-crime?date=2024-01",
            RecordSchema::new("/location/latitude", "/location/longitude")
                .with_property("category", "/category")
                .with_property("street", "/location/street/name"),
        )
    }

    fn viewport() -> Viewport {
        Viewport::new(
            GeoBounds::new(-1.15, 52.62, -1.12, 52.64),
            Size::new(1024, 768),
        )
    }

    #[test]
    fn polygon_lists_corners_clockwise_from_south_west() {
        let request = provider().build_request(&viewport()).expect("valid viewport");
        let pairs: Vec<_> = request.url.query_pairs().into_owned().collect();

        assert_eq!(
            pairs,
            [
                ("date".to_string(), "2024-01".to_string()),
                (
                    "poly".to_string(),
                    "52.620000,-1.150000:52.640000,-1.150000:52.640000,-1.120000:52.620000,-1.120000"
                        .to_string()
                )
            ]
        );
        assert_eq!(request.url.path(), "/api/crimes-street/all-crime");
    }

    #[test]
    fn invalid_viewport_is_an_error() {
        let viewport = Viewport::new(GeoBounds::new(0.0, 95.0, 1.0, 96.0), Size::new(10, 10));
        assert_matches!(
            provider().build_request(&viewport),
            Err(SyncError::Viewport(_))
        );
    }

    #[test]
    fn records_without_coordinates_are_dropped() {
        let body = br#"[
            {"category": "burglary", "location": {"latitude": "52.63", "longitude": "-1.13", "street": {"name": "On or near High Street"}}},
            {"category": "drugs", "location": {"latitude": null, "longitude": "-1.13"}},
            {"category": "other-theft"}
        ]"#;

        let provider = provider();
        let request = provider.build_request(&viewport()).expect("valid viewport");
        let data = provider
            .decode(Bytes::from_static(body), &request)
            .expect("decoded");

        let SourceData::GeoJson(collection) = data else {
            panic!("expected features");
        };
        assert_eq!(collection.features.len(), 1);
        assert_eq!(
            collection.features[0].property("category"),
            Some(&serde_json::json!("burglary"))
        );
    }

    #[test]
    fn non_list_response_is_a_decoding_error() {
        let provider = provider();
        let request = provider.build_request(&viewport()).expect("valid viewport");
        assert_matches!(
            provider.decode(Bytes::from_static(b"{\"error\": 1}"), &request),
            Err(SyncError::Decoding(_))
        );
    }
}
