//! # Observability
//!
//! Structured one-line JSON logging for the feature service.
//!
//! - Typed lifecycle and data events ([`Event`])
//! - Synchronous writes, no background threads
//! - Deterministic key order
//!
//! ```ignore
//! use geofeature::observability::{Event, Logger, ObservationScope};
//!
//! Logger::info(Event::FeatureCreated.as_str(), &[("table", "spatial_points"), ("id", "7")]);
//!
//! let scope = ObservationScope::new("MIGRATION");
//! // ... run statements ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

/// Log an event at its default severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    let severity = event.severity();
    if severity >= Severity::Error {
        Logger::log_stderr(severity, event.as_str(), fields);
    } else {
        Logger::log(severity, event.as_str(), fields);
    }
}
