//! Geographic primitives used by `layersync`: points and bounds in geographic coordinates (see
//! [`geo`]), their projection into planar coordinate systems, and simple cartesian types for
//! projected extents and pixel dimensions (see [`cartesian`]).

pub mod cartesian;
pub mod error;
pub mod geo;

pub use cartesian::{Point2d, Rect, Size};
pub use error::TypesError;
pub use geo::{Crs, GeoBounds, GeoPoint, GeoPoint2d, Projection, WebMercator};
