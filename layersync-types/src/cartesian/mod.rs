//! Planar types: projected points and extents, and pixel sizes.

mod point;
mod rect;
mod size;

pub use point::Point2d;
pub use rect::Rect;
pub use size::Size;
