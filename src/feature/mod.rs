//! # Features
//!
//! Entity model shared by points and polygons, generic over a
//! [`GeometryKind`], plus the GeoJSON serializer.
//!
//! Both entity kinds carry the same base fields (name, description,
//! opaque attributes, timestamps); only the geometry arity differs.

mod errors;
mod kind;
mod model;
mod serializer;

pub use errors::{FeatureError, FeatureResult};
pub use kind::{GeometryKind, PointKind, PolygonKind};
pub use model::{
    FeatureCreate, FeatureRecord, FeatureUpdate, PointCreate, PolygonCreate, MAX_NAME_CHARS,
};
pub use serializer::{
    to_feature, to_feature_collection, to_feature_with_distance, Feature, FeatureCollection,
    FeatureCollectionTag, FeatureTag,
    FeatureProperties,
};
