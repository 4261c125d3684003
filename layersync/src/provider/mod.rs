//! Remote data providers of viewport dependent overlays.
//!
//! A provider knows how to turn the current [`Viewport`] into a request url and how to turn the
//! response body into [`SourceData`]. Loading the body is done by the controller through the
//! [`Transport`](crate::platform::Transport), so providers never touch the network themselves.

use std::fmt::Debug;

use bytes::Bytes;
use layersync_types::{GeoBounds, Size};
use maybe_sync::{MaybeSend, MaybeSync};
use reqwest::Url;

use crate::engine::{SourceData, Viewport};
use crate::error::SyncError;

mod envelope_query;
mod image_export;
mod polygon_query;
mod record;

pub use envelope_query::EnvelopeQueryProvider;
pub use image_export::ImageExportProvider;
pub use polygon_query::PolygonQueryProvider;
pub use record::RecordSchema;

/// Builds requests to a remote service from the viewport and decodes its responses.
pub trait ViewportProvider: Debug + MaybeSend + MaybeSync {
    /// Creates the request for the data visible in the viewport.
    fn build_request(&self, viewport: &Viewport) -> Result<ProviderRequest, SyncError>;

    /// Converts the response body into the data of the overlay source.
    fn decode(&self, bytes: Bytes, request: &ProviderRequest) -> Result<SourceData, SyncError>;
}

/// Request to a provider, together with the viewport parameters it was built for.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    /// Full url including the query.
    pub url: Url,
    /// Geographic bounds of the viewport.
    pub bounds: GeoBounds,
    /// Size of the viewport in pixels.
    pub size: Size,
}

impl ProviderRequest {
    /// Creates a request for the viewport.
    pub fn new(url: Url, viewport: &Viewport) -> Self {
        Self {
            url,
            bounds: viewport.bounds,
            size: viewport.size,
        }
    }
}

fn parse_base_url(base: &str) -> Result<Url, SyncError> {
    Url::parse(base).map_err(|err| SyncError::InvalidUrl(format!("{base}: {err}")))
}
