//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error, PartialEq)]
pub enum TypesError {
    /// Coordinates are outside of the valid range or not finite.
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
    /// Point cannot be represented in the target coordinate system.
    #[error("failed to project point ({lat}, {lon}) into {target}")]
    Projection {
        /// Latitude of the point.
        lat: f64,
        /// Longitude of the point.
        lon: f64,
        /// Name of the target coordinate system.
        target: String,
    },
}
