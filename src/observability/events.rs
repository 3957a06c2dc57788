//! Observable events of the feature service

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Process starting
    Startup,
    /// Configuration resolved
    ConfigLoaded,
    /// Schema migration applied
    SchemaMigrated,
    /// HTTP listener bound
    Serving,
    /// Listener stopped
    Shutdown,

    // Data
    /// One feature inserted and committed
    FeatureCreated,
    /// Feature fields overwritten
    FeatureUpdated,
    /// Feature removed
    FeatureDeleted,
    /// A whole batch committed
    BatchCreated,
    /// A mutating transaction was rolled back
    TransactionRolledBack,
    /// Rollback itself failed
    RollbackFailed,

    // Queries
    /// A spatial predicate query returned
    SpatialQueryExecuted,

    // Requests
    /// A request ended in an error response
    RequestFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::Startup => "STARTUP",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaMigrated => "SCHEMA_MIGRATED",
            Event::Serving => "SERVING",
            Event::Shutdown => "SHUTDOWN",
            Event::FeatureCreated => "FEATURE_CREATED",
            Event::FeatureUpdated => "FEATURE_UPDATED",
            Event::FeatureDeleted => "FEATURE_DELETED",
            Event::BatchCreated => "BATCH_CREATED",
            Event::TransactionRolledBack => "TRANSACTION_ROLLED_BACK",
            Event::RollbackFailed => "ROLLBACK_FAILED",
            Event::SpatialQueryExecuted => "SPATIAL_QUERY_EXECUTED",
            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Default severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::TransactionRolledBack => Severity::Warn,
            Event::RollbackFailed | Event::RequestFailed => Severity::Error,
            Event::SpatialQueryExecuted => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
