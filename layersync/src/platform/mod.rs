//! Access to remote providers. The [`Transport`] trait is the only way the crate talks to the
//! network, so that the application (or a test) can substitute it.

use async_trait::async_trait;
use bytes::Bytes;
use maybe_sync::{MaybeSend, MaybeSync};
use reqwest::Url;

use crate::error::SyncError;

mod http;

pub use http::HttpTransport;

/// Issues HTTP GET requests to remote data providers.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Transport: MaybeSend + MaybeSync {
    /// Loads the body of the given url.
    ///
    /// Any non-success response must be returned as an error.
    async fn get(&self, url: &Url) -> Result<Bytes, SyncError>;
}
