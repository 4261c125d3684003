//! Datasets of the incident viewer: an OpenStreetMap basemap, San Francisco police incidents,
//! Contra Costa County law, EMS and fire zones, and the viewport driven crime, address point and
//! dispatch imagery overlays.

use std::sync::Arc;

use layersync_types::GeoPoint2d;

use crate::basemap::{BasemapConfig, RasterBasemap};
use crate::layer::{CircleStyle, Endpoint, OverlayLayer, OverlayStyle, PolygonStyle, PopupTemplate};
use crate::provider::{
    EnvelopeQueryProvider, ImageExportProvider, PolygonQueryProvider, RecordSchema,
};

/// Map center on start.
pub const INITIAL_CENTER: GeoPoint2d = GeoPoint2d::lonlat(-122.4194, 37.7749);
/// Zoom level on start.
pub const INITIAL_ZOOM: f64 = 12.0;

const OSM_TILES: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const ARCGIS_SERVICES: &str = "https://services7.arcgis.com/uFAr0LUPy14bDaLg/arcgis/rest/services";

/// OpenStreetMap raster tiles, no API key required.
pub fn osm_basemap() -> BasemapConfig {
    BasemapConfig::new(RasterBasemap {
        source_id: "osm-tiles".into(),
        layer_id: "osm-tiles".into(),
        tiles: vec![OSM_TILES.into()],
        tile_size: 256,
        attribution: Some(
            "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
                .into(),
        ),
        min_zoom: 0.0,
        max_zoom: 19.0,
    })
}

/// All overlays in draw order.
pub fn overlays() -> Vec<OverlayLayer> {
    vec![
        law_zones(),
        ems_zones(),
        fire_zones(),
        dispatch_imagery(),
        address_points(),
        street_crime(),
        incidents(),
    ]
}

/// San Francisco police incident reports.
pub fn incidents() -> OverlayLayer {
    OverlayLayer::new(
        "incidents",
        Endpoint::Static("https://data.sfgov.org/resource/wg3w-h783.geojson?$limit=1000".into()),
        OverlayStyle::Circle(CircleStyle {
            radius: 4.0,
            color: "#e11d48".into(),
            stroke_width: 1.0,
            stroke_color: "#ffffff".into(),
        }),
    )
    .with_title("SF Police Incidents")
    .with_opacity(0.7)
    .with_popup(
        PopupTemplate::new("incident_category", "Incident")
            .with_field("incident_datetime", "Date")
            .with_field("police_district", "District"),
    )
}

/// Contra Costa County law enforcement zones.
pub fn law_zones() -> OverlayLayer {
    zones("law", "Law Zones", "CCCLaw_Zones091625", "#1f77b4", "#aec7e8")
}

/// Contra Costa County EMS zones.
pub fn ems_zones() -> OverlayLayer {
    zones("ems", "EMS Zones", "CCC_EMS_Zones091725", "#ff7f0e", "#ffbb78")
}

/// Contra Costa County fire zones.
pub fn fire_zones() -> OverlayLayer {
    zones("fire", "Fire Zones", "CCC_Fire_Zones082225", "#2ca02c", "#98df8a")
}

/// Street-level crimes from `data.police.uk`, requested for the visible polygon.
pub fn street_crime() -> OverlayLayer {
    let schema = RecordSchema::new("/location/latitude", "/location/longitude")
        .with_property("category", "/category")
        .with_property("month", "/month")
        .with_property("street", "/location/street/name")
        .with_property("outcome", "/outcome_status/category");

    OverlayLayer::new(
        "crime",
        Endpoint::Viewport(Arc::new(PolygonQueryProvider::new(
            "https://data.police.uk/api/crimes-street/all-crime",
            schema,
        ))),
        OverlayStyle::Circle(CircleStyle {
            radius: 3.0,
            color: "#7c3aed".into(),
            stroke_width: 0.5,
            stroke_color: "#ffffff".into(),
        }),
    )
    .with_title("Street Crime")
    .with_opacity(0.8)
    .with_popup(
        PopupTemplate::new("category", "Crime")
            .with_field("month", "Month")
            .with_field("street", "Location")
            .with_field("outcome", "Outcome"),
    )
}

/// Address points of the visible area from an ArcGIS feature service.
///
/// Placeholder dataset: the service url follows the naming of the zone services but is not a
/// published county service. Point the provider at a real address point layer before showing the
/// overlay.
pub fn address_points() -> OverlayLayer {
    let provider = EnvelopeQueryProvider::new(format!(
        "{ARCGIS_SERVICES}/CCC_Address_Points/FeatureServer/0/query"
    ))
    .with_out_fields(["FULLADDR", "MUNICIPALITY", "ZIPCODE"]);

    OverlayLayer::new(
        "addresses",
        Endpoint::Viewport(Arc::new(provider)),
        OverlayStyle::Circle(CircleStyle {
            radius: 2.5,
            color: "#0f766e".into(),
            stroke_width: 0.0,
            stroke_color: "#ffffff".into(),
        }),
    )
    .with_title("Address Points")
    .with_visibility(false)
    .with_popup(
        PopupTemplate::new("FULLADDR", "Address")
            .with_field("MUNICIPALITY", "City")
            .with_field("ZIPCODE", "ZIP"),
    )
}

/// Dispatch area imagery rendered by an ArcGIS map service for the visible area.
///
/// Placeholder dataset: the county publishes no dispatch area map service under this url. The
/// overlay is hidden on start and is meant to be pointed at a real `MapServer/export` endpoint.
pub fn dispatch_imagery() -> OverlayLayer {
    OverlayLayer::new(
        "dispatch",
        Endpoint::Viewport(Arc::new(ImageExportProvider::new(format!(
            "{ARCGIS_SERVICES}/CCC_Dispatch_Areas/MapServer/export"
        )))),
        OverlayStyle::Raster,
    )
    .with_title("Dispatch Areas")
    .with_visibility(false)
    .with_opacity(0.6)
}

fn zones(id: &str, title: &str, service: &str, line_color: &str, fill_color: &str) -> OverlayLayer {
    OverlayLayer::new(
        id,
        Endpoint::Static(format!(
            "{ARCGIS_SERVICES}/{service}/FeatureServer/0/query?where=1=1&outFields=*&f=geojson"
        )),
        OverlayStyle::Polygon(PolygonStyle {
            fill_color: fill_color.into(),
            line_color: line_color.into(),
            line_width: 2.0,
        }),
    )
    .with_title(title)
    .with_opacity(0.5)
}
