//! Synchronization of overlay layers with the rendering engine.
//!
//! The [`LayerSyncController`] keeps the desired visibility and opacity of every overlay,
//! reconciles them with the engine and drives the requests of viewport dependent overlays. The
//! requests run in the background. Their results are sent back to the controller through a channel
//! and applied with [`LayerSyncController::apply_completion`], and only if no newer request was
//! issued for the same overlay in the meantime.

use crate::engine::SourceData;
use crate::error::SyncError;

mod controller;
mod fetch_state;
mod visual_state;

pub use controller::LayerSyncController;
pub use visual_state::DesiredVisualState;

/// Loading state of an overlay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LayerStatus {
    /// Nothing is loaded or loading.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request succeeded.
    Loaded {
        /// Number of features received, `None` for image data.
        features: Option<usize>,
    },
    /// The last request failed. The previously loaded data is still shown.
    Failed(String),
}

/// Result of [`LayerSyncController::ensure_registered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The source or some of the style layers were missing and were added.
    Created,
    /// Everything was already registered.
    AlreadyPresent,
    /// The engine style is not loaded yet, nothing was done.
    StyleNotReady,
}

/// Result of [`LayerSyncController::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The overlay is hidden. Its data was cleared and no request was issued.
    Hidden,
    /// The overlay is not registered with the engine yet. It will be refreshed after registration.
    Deferred,
    /// A request with the given sequence number was issued.
    Issued(u64),
    /// The overlay has a static url and is never refetched.
    NotViewportDependent,
}

/// Result of a background request of an overlay.
#[derive(Debug)]
pub struct FetchCompletion {
    /// Overlay id.
    pub layer: String,
    /// Sequence number of the request.
    pub seq: u64,
    /// Decoded data or the error it failed with.
    pub result: Result<SourceData, SyncError>,
}

/// What happened to a [`FetchCompletion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The data was set to the overlay source.
    Applied,
    /// A newer request was issued for the overlay, the overlay was hidden or its source is gone
    /// from the engine. The data was discarded.
    Superseded,
    /// The request was aborted.
    Cancelled,
    /// The request failed. The error was logged and stored in the overlay status.
    Failed,
}
