//! Error types used by the crate.

use layersync_types::TypesError;
use thiserror::Error;

/// Layersync error type.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network error while talking to a remote provider.
    #[error("failed to load data")]
    IO,
    /// Remote provider responded with a non-success status.
    #[error("provider responded with status {0}")]
    HttpStatus(u16),
    /// Provider response could not be turned into layer data.
    #[error("failed to decode provider response: {0}")]
    Decoding(String),
    /// Request was superseded by a newer one for the same layer, or the layer was hidden.
    #[error("request was cancelled")]
    Cancelled,
    /// No overlay with the given id was declared.
    #[error("unknown overlay layer: {0}")]
    UnknownLayer(String),
    /// Overlay declaration is inconsistent (duplicate id, unsupported endpoint and style
    /// combination).
    #[error("invalid overlay declaration: {0}")]
    InvalidOverlay(String),
    /// Opacity value is not a number.
    #[error("invalid opacity value: {0}")]
    InvalidOpacity(f32),
    /// Provider url or its parameters are malformed.
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    /// Current viewport cannot be turned into a provider request.
    #[error("invalid viewport: {0}")]
    Viewport(#[from] TypesError),
    /// Rendering engine rejected a call.
    #[error("rendering engine error: {0}")]
    Engine(String),
}

impl SyncError {
    /// Returns true if the error is the result of explicit cancellation and must not be reported.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SyncError::Cancelled)
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Self::HttpStatus(status.as_u16()),
            None => Self::IO,
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decoding(value.to_string())
    }
}

impl From<geojson::Error> for SyncError {
    fn from(value: geojson::Error) -> Self {
        Self::Decoding(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cancellation_is_cancelled() {
        assert!(SyncError::Cancelled.is_cancelled());
        assert!(!SyncError::HttpStatus(499).is_cancelled());
        assert!(!SyncError::IO.is_cancelled());
    }
}
