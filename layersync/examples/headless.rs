//! Loads the incident viewer overlays over San Francisco into the in-memory engine using the real
//! remote providers, then pans the map and prints what each overlay ended up with.
//!
//! Run with `RUST_LOG=layersync=debug` to see the requests.

use layersync::engine::SourceData;
use layersync::event::MapEventKind;
use layersync::layersync_types::{GeoBounds, GeoPoint2d, Point2d, Projection, Size, WebMercator};
use layersync::sync::LayerStatus;
use layersync::ui::UiEvent;
use layersync::{
    catalog, LayerSyncBuilder, LayerSyncController, MapEngine, MemoryEngine, Viewport,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let engine = MemoryEngine::new(viewport_around(
        catalog::INITIAL_CENTER,
        catalog::INITIAL_ZOOM,
        Size::new(1280, 800),
    )?);

    let mut controller = LayerSyncBuilder::new(engine)
        .with_overlays(catalog::overlays())
        .with_basemap(catalog::osm_basemap())
        .build()?;

    controller.attach();
    controller.handle_map_event(MapEventKind::Load.into())?;
    controller.handle_ui_event(UiEvent::Toggle {
        widget: "toggle-ems".into(),
        checked: false,
    })?;
    wait_for_loads(&mut controller).await;

    // Pan to Contra Costa County
    controller.engine_mut().set_viewport(Viewport::new(
        GeoBounds::new(-122.10, 37.88, -121.95, 37.98),
        Size::new(1280, 800),
    ));
    controller.handle_map_event(MapEventKind::Move.into())?;
    controller.handle_map_event(MapEventKind::MoveEnd.into())?;
    wait_for_loads(&mut controller).await;

    for overlay in controller.overlays() {
        let data = match controller.engine().source_data(overlay.id()) {
            Some(SourceData::GeoJson(collection)) => {
                format!("{} features", collection.features.len())
            }
            Some(SourceData::Image(image)) => format!("image of {} bytes", image.bytes.len()),
            None => "loaded by the engine".to_string(),
        };

        println!(
            "{:<20} {:<10} {:?}: {data}",
            overlay.title(),
            if controller
                .desired_state(overlay.id())
                .is_some_and(|state| state.visible())
            {
                "visible"
            } else {
                "hidden"
            },
            controller.status(overlay.id()).cloned().unwrap_or_default(),
        );
    }

    println!("draw order: {:?}", controller.engine().layer_ids());

    Ok(())
}

/// Viewport of a map canvas of the given size centered at the point, using 256 pixel web tiles.
fn viewport_around(center: GeoPoint2d, zoom: f64, size: Size) -> anyhow::Result<Viewport> {
    let projection = WebMercator::default();
    let center = projection.project(&center)?;
    let resolution = 2.0 * std::f64::consts::PI * 6_378_137.0 / (256.0 * 2f64.powf(zoom));
    let half_width = f64::from(size.width()) * resolution / 2.0;
    let half_height = f64::from(size.height()) * resolution / 2.0;

    let south_west =
        projection.unproject(&Point2d::new(center.x() - half_width, center.y() - half_height))?;
    let north_east =
        projection.unproject(&Point2d::new(center.x() + half_width, center.y() + half_height))?;

    Ok(Viewport::new(
        GeoBounds::from_corners(south_west, north_east),
        size,
    ))
}

async fn wait_for_loads(controller: &mut LayerSyncController<MemoryEngine>) {
    while controller
        .overlays()
        .iter()
        .any(|overlay| controller.status(overlay.id()) == Some(&LayerStatus::Loading))
    {
        if let Some(outcome) = controller.next_completion().await {
            log::debug!("Request completed: {outcome:?}");
        }
    }
}
