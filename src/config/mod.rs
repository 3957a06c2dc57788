//! # Service Configuration
//!
//! One [`ServiceConfig`] is built at startup and handed by reference to
//! whatever needs it. Nothing reads the environment after that.

mod errors;
mod service_config;

pub use errors::{ConfigError, ConfigResult};
pub use service_config::{ServiceConfig, StoreBackend, StoreConfig, DATABASE_URL_ENV};
