//! Geometry codec errors
//!
//! Every variant is a validation failure of caller input except
//! `MalformedWkt` and `UnexpectedGeometry`, which indicate the store
//! returned something the codec cannot read.

use thiserror::Error;

/// Result type for codec operations
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Geometry codec errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A coordinate did not have exactly two values
    #[error("Coordinates must be [longitude, latitude], got {0} value(s)")]
    WrongArity(usize),

    /// Longitude outside [-180, 180]
    #[error("Longitude {0} must be between -180 and 180")]
    LongitudeOutOfRange(f64),

    /// Latitude outside [-90, 90]
    #[error("Latitude {0} must be between -90 and 90")]
    LatitudeOutOfRange(f64),

    /// Ring has fewer than three input positions
    #[error("Polygon must have at least 3 coordinates, got {0}")]
    TooFewPositions(usize),

    /// Ring closes onto itself without enclosing an area
    #[error("Polygon ring must span at least 3 distinct positions")]
    DegenerateRing,

    /// Geometry carries a spatial reference other than WGS84
    #[error("Geometry has SRID {0}, expected 4326")]
    SridMismatch(i32),

    /// Stored geometry text could not be parsed
    #[error("Malformed geometry text: {0}")]
    MalformedWkt(String),

    /// Stored geometry is of a type this service does not serve
    #[error("Unexpected geometry type: expected {expected}, found {found}")]
    UnexpectedGeometry {
        expected: &'static str,
        found: String,
    },
}

impl GeometryError {
    /// True if the error describes bad caller input rather than bad stored data
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            GeometryError::MalformedWkt(_)
                | GeometryError::UnexpectedGeometry { .. }
                | GeometryError::SridMismatch(_)
        )
    }
}
