//! # Feature Repository
//!
//! CRUD, batch insert and predicate queries for one geometry kind.
//!
//! Every mutation runs in its own store transaction and is rolled back
//! before any error reaches the caller. Points and polygons share the
//! same implementation through [`GeometryKind`](crate::feature::GeometryKind).

mod feature_repository;
mod params;

pub use feature_repository::{FeatureMatch, FeatureRepository, PointRepository, PolygonRepository};
pub use params::{ListParams, DEFAULT_LIST_LIMIT, DEFAULT_MAX_LIST_LIMIT};
