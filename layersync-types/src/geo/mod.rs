//! Geometries in geographic coordinates (latitude and longitude) (see [`GeoPoint`],
//! [`GeoBounds`]) and conversion into projected coordinate systems (see [`Projection`]).

mod bounds;
mod crs;
mod datum;
mod point;
mod projection;

pub use bounds::GeoBounds;
pub use crs::Crs;
pub use datum::Datum;
pub use point::{GeoPoint, GeoPoint2d};
pub use projection::{Projection, WebMercator};
