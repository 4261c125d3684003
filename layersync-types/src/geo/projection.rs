use crate::cartesian::Point2d;
use crate::error::TypesError;
use crate::geo::datum::Datum;
use crate::geo::point::{GeoPoint, GeoPoint2d};
use crate::geo::Crs;

/// Conversion of geographic coordinates into a planar coordinate system.
pub trait Projection {
    /// Coordinate system the points are projected into.
    fn target(&self) -> Crs;
    /// Projects a geographic point.
    fn project(&self, input: &GeoPoint2d) -> Result<Point2d, TypesError>;
    /// Converts a projected point back into geographic coordinates.
    fn unproject(&self, input: &Point2d) -> Result<GeoPoint2d, TypesError>;
}

/// Spherical Web Mercator (`EPSG:3857`).
///
/// Latitudes are clamped to the extent of the projection ([`WebMercator::MAX_LATITUDE`]) so that
/// a viewport zoomed out past the poles still produces a finite bounding box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WebMercator {
    datum: Datum,
}

impl WebMercator {
    /// Maximum absolute latitude representable in the projection.
    pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

    /// Creates a new projection on the given datum.
    pub fn new(datum: Datum) -> Self {
        Self { datum }
    }
}

impl Default for WebMercator {
    fn default() -> Self {
        Self::new(Datum::WGS84)
    }
}

impl Projection for WebMercator {
    fn target(&self) -> Crs {
        Crs::EPSG3857
    }

    fn project(&self, input: &GeoPoint2d) -> Result<Point2d, TypesError> {
        let lat = input
            .lat()
            .clamp(-Self::MAX_LATITUDE, Self::MAX_LATITUDE)
            .to_radians();
        let x = self.datum.semimajor() * input.lon_rad();
        let y = self.datum.semimajor() * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();

        if x.is_finite() && y.is_finite() {
            Ok(Point2d::new(x, y))
        } else {
            Err(TypesError::Projection {
                lat: input.lat(),
                lon: input.lon(),
                target: self.target().to_string(),
            })
        }
    }

    fn unproject(&self, input: &Point2d) -> Result<GeoPoint2d, TypesError> {
        let lat = std::f64::consts::FRAC_PI_2
            - 2.0 * (-input.y() / self.datum.semimajor()).exp().atan();
        let lon = input.x() / self.datum.semimajor();

        Ok(GeoPoint2d::latlon(lat.to_degrees(), lon.to_degrees()))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::latlon;

    #[test]
    fn projects_known_points() {
        let projection = WebMercator::default();

        let origin = projection.project(&latlon!(0.0, 0.0)).expect("origin");
        assert_relative_eq!(origin.x(), 0.0);
        assert_relative_eq!(origin.y(), 0.0, epsilon = 1e-9);

        let sf = projection
            .project(&latlon!(37.7749, -122.4194))
            .expect("projected");
        assert_relative_eq!(sf.x(), -13_627_665.27, epsilon = 1.0);
        assert_relative_eq!(sf.y(), 4_547_675.35, epsilon = 1.0);
    }

    #[test]
    fn clamps_polar_latitudes() {
        let projection = WebMercator::default();
        let pole = projection.project(&latlon!(90.0, 0.0)).expect("clamped");
        let edge = projection
            .project(&latlon!(WebMercator::MAX_LATITUDE, 0.0))
            .expect("edge");

        assert_relative_eq!(pole.y(), edge.y());
        assert_relative_eq!(edge.y(), 20_037_508.34, epsilon = 1.0);
    }

    #[test]
    fn unproject_inverts_project() {
        let projection = WebMercator::default();
        let point = latlon!(37.9, -121.9);
        let back = projection
            .unproject(&projection.project(&point).expect("projected"))
            .expect("unprojected");

        assert_relative_eq!(back.lat(), point.lat(), epsilon = 1e-9);
        assert_relative_eq!(back.lon(), point.lon(), epsilon = 1e-9);
    }
}
