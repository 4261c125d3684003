use async_trait::async_trait;
use bytes::Bytes;
use log::{info, trace};
use reqwest::Url;

use super::Transport;
use crate::error::SyncError;

#[cfg(not(target_arch = "wasm32"))]
const USER_AGENT: &str = concat!("layersync/", env!("CARGO_PKG_VERSION"));

/// [`Transport`] loading data with a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the default client configuration.
    pub fn new() -> Result<Self, SyncError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.user_agent(USER_AGENT);

        let http_client = builder.build()?;
        Ok(Self { http_client })
    }

    /// Creates a transport using the given client.
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Bytes, SyncError> {
        trace!("GET {url}");
        let response = self.http_client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            info!("Failed to load {url}: {status}");
            return Err(SyncError::HttpStatus(status.as_u16()));
        }

        Ok(response.bytes().await?)
    }
}
