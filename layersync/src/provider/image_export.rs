use bytes::Bytes;
use layersync_types::{Crs, WebMercator};

use super::{parse_base_url, ProviderRequest, ViewportProvider};
use crate::engine::{ImageData, SourceData, Viewport};
use crate::error::SyncError;

/// ArcGIS map service `export` operation rendering the viewport into a single image.
///
/// The viewport is reprojected into Web Mercator meters and the image is requested with the
/// pixel size of the viewport, so that it can be placed at the viewport corners without resampling.
#[derive(Debug, Clone)]
pub struct ImageExportProvider {
    base_url: String,
    format: String,
    projection: WebMercator,
}

impl ImageExportProvider {
    /// Creates a provider for the `.../MapServer/export` url, requesting `png32` images.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            format: "png32".into(),
            projection: WebMercator::default(),
        }
    }

    /// Sets the image format requested from the service (`png`, `png32`, `jpg`).
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }
}

impl ViewportProvider for ImageExportProvider {
    fn build_request(&self, viewport: &Viewport) -> Result<ProviderRequest, SyncError> {
        if viewport.size.is_zero() {
            return Err(SyncError::InvalidUrl(format!(
                "cannot export an image of size {}x{}",
                viewport.size.width(),
                viewport.size.height()
            )));
        }

        viewport.bounds.validate()?;
        let rect = viewport.bounds.project(&self.projection)?;

        let bbox = format!(
            "{},{},{},{}",
            rect.x_min(),
            rect.y_min(),
            rect.x_max(),
            rect.y_max()
        );
        let size = format!("{},{}", viewport.size.width(), viewport.size.height());
        let srid = Crs::EPSG3857.wkid().to_string();

        let mut url = parse_base_url(&self.base_url)?;
        url.query_pairs_mut()
            .append_pair("bbox", &bbox)
            .append_pair("bboxSR", &srid)
            .append_pair("imageSR", &srid)
            .append_pair("size", &size)
            .append_pair("format", &self.format)
            .append_pair("transparent", "true")
            .append_pair("f", "image");

        Ok(ProviderRequest::new(url, viewport))
    }

    fn decode(&self, bytes: Bytes, request: &ProviderRequest) -> Result<SourceData, SyncError> {
        let format = image::guess_format(&bytes)
            .map_err(|err| SyncError::Decoding(format!("not an image: {err}")))?;
        log::trace!("Received {format:?} image of {} bytes", bytes.len());

        Ok(SourceData::Image(ImageData::new(bytes, &request.bounds)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use layersync_types::{GeoBounds, Size};

    use super::*;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn request() -> ProviderRequest {
        let viewport = Viewport::new(
            GeoBounds::new(-122.5, 37.7, -122.3, 37.8),
            Size::new(1024, 512),
        );
        ImageExportProvider::new("https://example.com/arcgis/rest/services/Dispatch/MapServer/export")
            .build_request(&viewport)
            .expect("valid viewport")
    }

    #[test]
    fn bbox_is_in_web_mercator() {
        let params: HashMap<_, _> = request().url.query_pairs().into_owned().collect();

        let bbox: Vec<f64> = params["bbox"]
            .split(',')
            .map(|v| v.parse().expect("number"))
            .collect();
        assert_eq!(bbox.len(), 4);
        assert_relative_eq!(bbox[0], -13636637.6, epsilon = 1.0);
        assert_relative_eq!(bbox[1], 4537132.1, epsilon = 1.0);
        assert_relative_eq!(bbox[2], -13614373.7, epsilon = 1.0);
        assert_relative_eq!(bbox[3], 4551210.9, epsilon = 1.0);

        assert_eq!(params["bboxSR"], "3857");
        assert_eq!(params["imageSR"], "3857");
        assert_eq!(params["size"], "1024,512");
        assert_eq!(params["format"], "png32");
        assert_eq!(params["transparent"], "true");
        assert_eq!(params["f"], "image");
    }

    #[test]
    fn image_is_placed_at_request_bounds() {
        let request = request();
        let data = ImageExportProvider::new("https://example.com/export")
            .decode(Bytes::from_static(PNG_SIGNATURE), &request)
            .expect("png accepted");

        let SourceData::Image(image) = data else {
            panic!("expected image");
        };
        assert_eq!(image.coordinates[0], [-122.5, 37.8]);
        assert_eq!(image.coordinates[2], [-122.3, 37.7]);
    }

    #[test]
    fn error_page_is_rejected() {
        assert_matches!(
            ImageExportProvider::new("https://example.com/export")
                .decode(Bytes::from_static(b"{\"error\":{}}"), &request()),
            Err(SyncError::Decoding(_))
        );
    }

    #[test]
    fn empty_viewport_is_rejected() {
        let viewport = Viewport::new(GeoBounds::new(0.0, 0.0, 1.0, 1.0), Size::new(0, 0));
        assert!(ImageExportProvider::new("https://example.com/export")
            .build_request(&viewport)
            .is_err());
    }
}
