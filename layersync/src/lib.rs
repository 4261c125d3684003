//! Layersync keeps remote overlay layers of a web map in agreement with the UI that controls them
//! and with the part of the map the user is looking at.
//!
//! # Quick start
//!
//! ```no_run
//! use layersync::{catalog, LayerSyncBuilder, MapEngine, MemoryEngine, Viewport};
//! use layersync::event::MapEventKind;
//! use layersync::layersync_types::{GeoBounds, Size};
//! use layersync::ui::UiEvent;
//!
//! # tokio_test::block_on(async {
//! let engine = MemoryEngine::new(Viewport::new(
//!     GeoBounds::new(-122.52, 37.70, -122.35, 37.83),
//!     Size::new(1280, 800),
//! ));
//!
//! let mut controller = LayerSyncBuilder::new(engine)
//!     .with_overlays(catalog::overlays())
//!     .with_basemap(catalog::osm_basemap())
//!     .build()
//!     .unwrap();
//!
//! controller.attach();
//! controller.handle_map_event(MapEventKind::Load.into()).unwrap();
//! controller
//!     .handle_ui_event(UiEvent::Slider { widget: "opacity-law".into(), value: 0.3 })
//!     .unwrap();
//!
//! // Street crime is the only visible viewport dependent overlay
//! if let Some(outcome) = controller.next_completion().await {
//!     println!("{outcome:?}");
//! }
//! # });
//! ```
//!
//! # Main components
//!
//! * [`MapEngine`] is the interface of the rendering engine: it stores sources and style layers,
//!   reports the viewport and delivers [`events`](event). [`MemoryEngine`] implements it without
//!   drawing anything.
//! * [`OverlayLayer`](layer::OverlayLayer) describes an overlay: its id, style, initial state and
//!   where the data comes from. Data of viewport dependent overlays is requested from a
//!   [`ViewportProvider`](provider::ViewportProvider) every time the viewport stops moving.
//! * [`LayerSyncController`] owns the engine and the desired state of every overlay. It reacts to
//!   map and [`UI`](ui) events, registers sources and layers idempotently and makes sure only the
//!   response of the latest request of an overlay is ever shown.
//! * [`Transport`] loads provider responses. [`HttpTransport`] does it with `reqwest`.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub(crate) mod async_runtime;
pub mod basemap;
mod builder;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod event;
pub mod layer;
mod platform;
pub mod provider;
pub mod sync;
pub mod ui;

pub use builder::LayerSyncBuilder;
pub use engine::{MapEngine, MemoryEngine, Viewport};
pub use error::SyncError;
pub use layersync_types;
pub use platform::{HttpTransport, Transport};
pub use sync::LayerSyncController;
