//! # geofeature
//!
//! A spatial feature service: point and polygon features stored in a
//! geometry-aware database and served as GeoJSON.
//!
//! Request flow:
//!
//! 1. [`geometry`] validates `[longitude, latitude]` input and encodes it
//! 2. [`repository`] runs the store operation inside one transaction
//! 3. [`feature`] renders stored records as `Feature` / `FeatureCollection`
//!
//! Composite spatial queries go through [`query`]. Every spatial predicate
//! is evaluated by the [`store`], never in process.

pub mod cli;
pub mod config;
pub mod feature;
pub mod geometry;
pub mod http_server;
pub mod observability;
pub mod query;
pub mod repository;
pub mod store;
