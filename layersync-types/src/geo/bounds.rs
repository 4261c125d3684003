use serde::{Deserialize, Serialize};

use crate::cartesian::{Point2d, Rect};
use crate::error::TypesError;
use crate::geo::point::GeoPoint2d;
use crate::geo::projection::Projection;

/// Axis aligned bounds in geographic coordinates (degrees).
///
/// This is what a web map engine reports as the visible extent of its viewport. The bounds are
/// not normalized: unless the viewport crosses the antimeridian, `west <= east` holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl GeoBounds {
    /// Creates new bounds from the western, southern, eastern and northern edges.
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Creates bounds from the south-west and north-east corners.
    pub fn from_corners(south_west: GeoPoint2d, north_east: GeoPoint2d) -> Self {
        use crate::geo::GeoPoint;

        Self::new(
            south_west.lon(),
            south_west.lat(),
            north_east.lon(),
            north_east.lat(),
        )
    }

    /// Western edge (minimum longitude).
    pub fn west(&self) -> f64 {
        self.west
    }

    /// Southern edge (minimum latitude).
    pub fn south(&self) -> f64 {
        self.south
    }

    /// Eastern edge (maximum longitude).
    pub fn east(&self) -> f64 {
        self.east
    }

    /// Northern edge (maximum latitude).
    pub fn north(&self) -> f64 {
        self.north
    }

    /// South-west corner.
    pub fn south_west(&self) -> GeoPoint2d {
        GeoPoint2d::latlon(self.south, self.west)
    }

    /// North-west corner.
    pub fn north_west(&self) -> GeoPoint2d {
        GeoPoint2d::latlon(self.north, self.west)
    }

    /// North-east corner.
    pub fn north_east(&self) -> GeoPoint2d {
        GeoPoint2d::latlon(self.north, self.east)
    }

    /// South-east corner.
    pub fn south_east(&self) -> GeoPoint2d {
        GeoPoint2d::latlon(self.south, self.east)
    }

    /// Four corners of the bounds in clockwise order starting from the south-west one.
    pub fn corners(&self) -> [GeoPoint2d; 4] {
        [
            self.south_west(),
            self.north_west(),
            self.north_east(),
            self.south_east(),
        ]
    }

    /// Returns the bounds shifted by whole turns so that their center is inside `[-180, 180)`,
    /// with the longitudes clamped to that range.
    ///
    /// Web map engines drawing world copies report longitudes outside of the degree range once
    /// the map is panned across the antimeridian. Bounds wider than the whole world cover all
    /// longitudes. Latitudes are left as is.
    pub fn normalized(&self) -> Self {
        if !(self.west.is_finite() && self.east.is_finite()) {
            return *self;
        }

        if self.east - self.west >= 360.0 {
            return Self::new(-180.0, self.south, 180.0, self.north);
        }

        let center = (self.west + self.east) / 2.0;
        let shift = ((center + 180.0) / 360.0).floor() * 360.0;
        Self::new(
            (self.west - shift).max(-180.0),
            self.south,
            (self.east - shift).min(180.0),
            self.north,
        )
    }

    /// Checks that all edges are finite, inside degree ranges and that the bounds are not
    /// inverted in latitude.
    pub fn validate(&self) -> Result<(), TypesError> {
        if !self.corners().iter().all(GeoPoint2d::is_valid) {
            return Err(TypesError::InvalidCoordinates(format!("{self:?}")));
        }

        if self.south > self.north {
            return Err(TypesError::InvalidCoordinates(format!(
                "south edge {} is above north edge {}",
                self.south, self.north
            )));
        }

        Ok(())
    }

    /// Projects the bounds into a planar coordinate system. The resulting rectangle covers both
    /// projected corners.
    pub fn project<P>(&self, projection: &P) -> Result<Rect, TypesError>
    where
        P: Projection + ?Sized,
    {
        let sw: Point2d = projection.project(&self.south_west())?;
        let ne: Point2d = projection.project(&self.north_east())?;

        Ok(Rect::from_corners(sw, ne))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::geo::GeoPoint;

    #[test]
    fn corners_are_clockwise_from_south_west() {
        let bounds = GeoBounds::new(-122.5, 37.7, -122.3, 37.8);
        let corners = bounds.corners();

        assert_eq!((corners[0].lat(), corners[0].lon()), (37.7, -122.5));
        assert_eq!((corners[1].lat(), corners[1].lon()), (37.8, -122.5));
        assert_eq!((corners[2].lat(), corners[2].lon()), (37.8, -122.3));
        assert_eq!((corners[3].lat(), corners[3].lon()), (37.7, -122.3));
    }

    #[test]
    fn validate_rejects_inverted_latitude() {
        let bounds = GeoBounds::new(0.0, 10.0, 1.0, 5.0);
        assert!(bounds.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite() {
        let bounds = GeoBounds::new(f64::NAN, 0.0, 1.0, 1.0);
        assert!(bounds.validate().is_err());
        assert!(GeoBounds::new(-1.0, -1.0, 1.0, 1.0).validate().is_ok());
    }

    #[test]
    fn normalized_wraps_world_copies() {
        let west_copy = GeoBounds::new(-482.52, 37.70, -482.35, 37.83).normalized();
        assert_abs_diff_eq!(west_copy.west(), -122.52, epsilon = 1e-9);
        assert_abs_diff_eq!(west_copy.east(), -122.35, epsilon = 1e-9);
        assert_eq!(west_copy.south(), 37.70);

        let east_copy = GeoBounds::new(237.48, 37.70, 237.65, 37.83).normalized();
        assert_abs_diff_eq!(east_copy.west(), -122.52, epsilon = 1e-9);
        assert!(east_copy.validate().is_ok());
    }

    #[test]
    fn normalized_clamps_antimeridian_crossing() {
        let bounds = GeoBounds::new(-190.0, 37.70, -170.0, 37.83).normalized();
        assert_eq!(bounds, GeoBounds::new(-180.0, 37.70, -170.0, 37.83));
        assert!(bounds.validate().is_ok());

        let world = GeoBounds::new(-400.0, -60.0, 400.0, 60.0).normalized();
        assert_eq!(world, GeoBounds::new(-180.0, -60.0, 180.0, 60.0));

        let inside = GeoBounds::new(-122.52, 37.70, -122.35, 37.83);
        assert_eq!(inside.normalized(), inside);
    }
}
