use serde::{Deserialize, Serialize};

/// Coordinate reference system identified by its EPSG code.
///
/// Remote GIS services expect the spatial reference of a query geometry to be given explicitly,
/// usually as a `wkid` number. Only the systems the crate can produce coordinates in are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// Geographic coordinates on WGS84 ellipsoid (degrees).
    Wgs84,
    /// Web Mercator projection on WGS84 ellipsoid (meters).
    WebMercator,
}

impl Crs {
    /// `EPSG:4326`.
    pub const EPSG4326: Crs = Crs::Wgs84;
    /// `EPSG:3857`.
    pub const EPSG3857: Crs = Crs::WebMercator;

    /// Well known id of the system.
    pub fn wkid(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.wkid())
    }
}
