//! # HTTP Server Module
//!
//! Thin REST glue over the repository and query orchestrator.
//!
//! # Endpoints
//!
//! - `/health` - Liveness
//! - `/api/points`, `/api/polygons` - CRUD and batch create
//! - `/api/points/search/radius` - Radius search
//! - `/api/polygons/{id}/points`, `/api/polygons/intersect`,
//!   `/api/polygons/contains`, `/api/geo/intersect` - Spatial queries

pub mod config;
pub mod errors;
pub mod feature_routes;
pub mod health_routes;
pub mod query_routes;
pub mod server;
pub mod state;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
pub use state::AppState;
