#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use layersync::engine::{LayerKind, LayerSpec, SourceData, SourceSpec};
use layersync::layer::{
    CircleStyle, Endpoint, OverlayLayer, OverlayStyle, PolygonStyle, PopupTemplate,
};
use layersync::layersync_types::{GeoBounds, Size};
use layersync::provider::{ImageExportProvider, PolygonQueryProvider, RecordSchema};
use layersync::{
    LayerSyncBuilder, LayerSyncController, MemoryEngine, SyncError, Transport, Viewport,
};
use parking_lot::Mutex;
use reqwest::Url;
use tokio::sync::oneshot;

type Reply = Result<Bytes, SyncError>;

/// Transport whose responses are fed by the test. Requests are numbered in arrival order.
#[derive(Default)]
pub struct ScriptedTransport {
    state: Mutex<ScriptState>,
}

#[derive(Default)]
struct ScriptState {
    requests: Vec<Url>,
    pending: Vec<Option<oneshot::Sender<Reply>>>,
}

impl ScriptedTransport {
    pub fn requests(&self) -> Vec<Url> {
        self.state.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// Completes the request with the given index. Returns false if the request was already
    /// aborted by the controller.
    pub fn respond(&self, index: usize, body: impl Into<Bytes>) -> bool {
        self.reply(index, Ok(body.into()))
    }

    pub fn fail(&self, index: usize, status: u16) -> bool {
        self.reply(index, Err(SyncError::HttpStatus(status)))
    }

    fn reply(&self, index: usize, reply: Reply) -> bool {
        let sender = self
            .state
            .lock()
            .pending
            .get_mut(index)
            .and_then(Option::take)
            .unwrap_or_else(|| panic!("request {index} was not issued or already answered"));
        sender.send(reply).is_ok()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url) -> Result<Bytes, SyncError> {
        let (sender, receiver) = oneshot::channel();
        {
            let mut state = self.state.lock();
            state.requests.push(url.clone());
            state.pending.push(Some(sender));
        }

        receiver.await.unwrap_or(Err(SyncError::IO))
    }
}

/// Lets the spawned request tasks run until they block.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub fn san_francisco() -> Viewport {
    Viewport::new(
        GeoBounds::new(-122.52, 37.70, -122.35, 37.83),
        Size::new(1280, 800),
    )
}

pub fn oakland() -> Viewport {
    Viewport::new(
        GeoBounds::new(-122.33, 37.76, -122.16, 37.86),
        Size::new(1280, 800),
    )
}

pub fn berkeley() -> Viewport {
    Viewport::new(
        GeoBounds::new(-122.32, 37.84, -122.23, 37.90),
        Size::new(1280, 800),
    )
}

pub fn crime() -> OverlayLayer {
    OverlayLayer::new(
        "crime",
        Endpoint::Viewport(Arc::new(PolygonQueryProvider::new(
            "https://crime.test/api/crimes-street/all-crime",
            RecordSchema::new("/location/latitude", "/location/longitude")
                .with_property("category", "/category"),
        ))),
        OverlayStyle::Circle(CircleStyle {
            radius: 3.0,
            color: "#7c3aed".into(),
            stroke_width: 1.0,
            stroke_color: "#ffffff".into(),
        }),
    )
    .with_popup(PopupTemplate::new("category", "Crime").with_field("street", "Street"))
}

pub fn law() -> OverlayLayer {
    OverlayLayer::new(
        "law",
        Endpoint::Static("https://zones.test/law.geojson".into()),
        OverlayStyle::Polygon(PolygonStyle {
            fill_color: "#aec7e8".into(),
            line_color: "#1f77b4".into(),
            line_width: 2.0,
        }),
    )
    .with_opacity(0.5)
}

pub fn dispatch() -> OverlayLayer {
    OverlayLayer::new(
        "dispatch",
        Endpoint::Viewport(Arc::new(ImageExportProvider::new(
            "https://dispatch.test/MapServer/export",
        ))),
        OverlayStyle::Raster,
    )
    .with_visibility(false)
}

/// Engine with a vector style of two layers.
pub fn styled_engine(viewport: Viewport) -> MemoryEngine {
    MemoryEngine::with_style(
        viewport,
        vec![("streets".into(), SourceSpec::GeoJsonUrl("https://streets.test".into()))],
        vec![
            LayerSpec::new("water", LayerKind::Fill, "streets"),
            LayerSpec::new("roads", LayerKind::Line, "streets"),
        ],
    )
}

pub fn controller(
    overlays: Vec<OverlayLayer>,
) -> (LayerSyncController<MemoryEngine>, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::default());
    let controller = LayerSyncBuilder::new(styled_engine(san_francisco()))
        .with_overlays(overlays)
        .with_transport(transport.clone())
        .build()
        .expect("valid overlays");

    (controller, transport)
}

pub fn crime_records(categories: &[&str]) -> String {
    let records: Vec<_> = categories
        .iter()
        .map(|category| {
            serde_json::json!({
                "category": category,
                "location": {"latitude": "37.77", "longitude": "-122.42"}
            })
        })
        .collect();
    serde_json::Value::from(records).to_string()
}

pub fn feature_categories(data: &SourceData) -> Vec<String> {
    let SourceData::GeoJson(collection) = data else {
        panic!("expected features, got {data:?}");
    };
    collection
        .features
        .iter()
        .filter_map(|feature| feature.property("category")?.as_str().map(str::to_owned))
        .collect()
}
