//! # Geometry Codec
//!
//! Converts between the external coordinate representation (`[longitude, latitude]`
//! pairs) and the store's native geometry text (WKT tagged with an SRID).
//!
//! # Responsibilities
//!
//! - Coordinate bounds and arity validation
//! - Ring closure for polygons
//! - Decoding stored geometry back into GeoJSON geometry objects
//!
//! Encoding is pure: no I/O, deterministic for identical input.

mod codec;
mod decode;
mod errors;

pub use codec::{
    close_ring, encode_point, encode_polygon, GeometryLiteral, Position, MIN_RING_POSITIONS,
    WGS84_SRID,
};
pub use decode::{decode, parse_stored, GeoJsonGeometry, GeometryType, StoredGeometry};
pub use errors::{GeometryError, GeometryResult};
