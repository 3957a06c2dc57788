//! # Query Orchestrator
//!
//! Composite spatial queries. Each one builds its geometry operand with the
//! codec (or from a stored feature) and hands the predicate to the store.
//! All of them are read-only.

mod orchestrator;

pub use orchestrator::{RadiusHit, SpatialQueries};
