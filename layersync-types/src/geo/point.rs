use serde::{Deserialize, Serialize};

/// Point on the surface of the Earth given in degrees.
pub trait GeoPoint {
    /// Latitude in degrees.
    fn lat(&self) -> f64;
    /// Longitude in degrees.
    fn lon(&self) -> f64;

    /// Latitude in radians.
    fn lat_rad(&self) -> f64 {
        self.lat().to_radians()
    }

    /// Longitude in radians.
    fn lon_rad(&self) -> f64 {
        self.lon().to_radians()
    }
}

/// 2d point in geographic coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct GeoPoint2d {
    lat: f64,
    lon: f64,
}

impl GeoPoint2d {
    /// Creates a new point from latitude and longitude in degrees.
    pub const fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Creates a new point from longitude and latitude in degrees. This is the order used by
    /// GeoJSON and most web map engines.
    pub const fn lonlat(lon: f64, lat: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns `[lon, lat]` pair, as used by GeoJSON positions.
    pub fn to_lonlat_array(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Returns true if both coordinates are finite and inside the valid degree ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl GeoPoint for GeoPoint2d {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

/// Creates a new [`GeoPoint2d`] from latitude and longitude values (in degrees).
///
/// ```
/// use layersync_types::geo::GeoPoint;
/// use layersync_types::latlon;
///
/// let point = latlon!(38.0, 52.0);
/// assert_eq!(point.lat(), 38.0);
/// ```
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        $crate::geo::GeoPoint2d::latlon($lat, $lon)
    };
}
