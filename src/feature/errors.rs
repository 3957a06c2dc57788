//! # Feature Service Errors
//!
//! The three error kinds surfaced by repository and query operations:
//! validation, not found, and store failure.

use thiserror::Error;

use crate::geometry::GeometryError;
use crate::store::{FeatureId, StoreError};

/// Result type for feature operations
pub type FeatureResult<T> = Result<T, FeatureError>;

/// Feature service errors
#[derive(Debug, Clone, Error)]
pub enum FeatureError {
    // ==================
    // Validation
    // ==================
    /// Coordinates failed codec validation
    #[error("{0}")]
    Geometry(#[from] GeometryError),

    /// A non-geometry field is invalid
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Requested page size is above the configured cap
    #[error("Limit {0} exceeds maximum {1}")]
    LimitExceeded(usize, usize),

    // ==================
    // Lookup
    // ==================
    /// Identifier does not resolve
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: FeatureId },

    // ==================
    // Store
    // ==================
    /// Transaction, connection or constraint failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FeatureError {
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        FeatureError::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: FeatureId) -> Self {
        FeatureError::NotFound { kind, id }
    }

    /// True for errors caused by caller input
    pub fn is_validation(&self) -> bool {
        match self {
            FeatureError::Geometry(e) => e.is_input_error(),
            FeatureError::InvalidField { .. } | FeatureError::LimitExceeded(_, _) => true,
            FeatureError::NotFound { .. } | FeatureError::Store(_) => false,
        }
    }

    /// Stable code used in logs
    pub fn code(&self) -> &'static str {
        match self {
            FeatureError::Geometry(e) if e.is_input_error() => "GEO_INVALID_GEOMETRY",
            FeatureError::Geometry(_) => "GEO_CORRUPT_GEOMETRY",
            FeatureError::InvalidField { .. } => "GEO_INVALID_FIELD",
            FeatureError::LimitExceeded(_, _) => "GEO_LIMIT_EXCEEDED",
            FeatureError::NotFound { .. } => "GEO_NOT_FOUND",
            FeatureError::Store(_) => "GEO_STORE_FAILED",
        }
    }
}
