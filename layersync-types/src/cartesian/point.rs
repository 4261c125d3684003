use serde::{Deserialize, Serialize};

/// Point in a projected coordinate system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2d {
    x: f64,
    y: f64,
}

impl Point2d {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// X coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }
}
