//! # Store Errors

use thiserror::Error;

use crate::geometry::GeometryError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by the backing store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Could not reach the database or acquire a connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement failed (constraint violation, bad SQL, rejected geometry)
    #[error("Query failed: {0}")]
    Query(String),

    /// Transaction could not begin, commit or roll back
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// A returned row could not be read
    #[error("Row decode error: {0}")]
    Decode(String),

    /// The store was handed geometry it cannot evaluate
    #[error("Geometry rejected by store: {0}")]
    Geometry(#[from] GeometryError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Connection(err.to_string())
            }
            sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_) => StoreError::Decode(err.to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}
