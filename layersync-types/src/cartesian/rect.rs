use serde::{Deserialize, Serialize};

use super::Point2d;

/// Axis aligned rectangle in a projected coordinate system.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Rect {
    /// Creates a new rectangle. Edges are reordered if given inverted.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min: x_min.min(x_max),
            y_min: y_min.min(y_max),
            x_max: x_max.max(x_min),
            y_max: y_max.max(y_min),
        }
    }

    /// Creates the smallest rectangle containing both points.
    pub fn from_corners(a: Point2d, b: Point2d) -> Self {
        Self::new(a.x(), a.y(), b.x(), b.y())
    }

    /// Minimum x.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Minimum y.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Maximum x.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Maximum y.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Returns true if the point is inside the rectangle or on its border.
    pub fn contains(&self, point: &Point2d) -> bool {
        self.x_min <= point.x()
            && self.x_max >= point.x()
            && self.y_min <= point.y()
            && self.y_max >= point.y()
    }
}
