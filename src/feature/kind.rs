//! Geometry kinds: what distinguishes a point feature from a polygon feature

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::geometry::{encode_point, encode_polygon, GeometryLiteral, GeometryResult, GeometryType};
use crate::store::FeatureTable;

/// Compile-time description of one feature class
pub trait GeometryKind: Debug + Clone + Copy + Send + Sync + 'static {
    /// External coordinate shape accepted on create/update
    type Coordinates: Debug + Clone + Serialize + DeserializeOwned + Send + Sync;

    /// Table the features live in
    const TABLE: FeatureTable;

    /// Geometry type every stored feature must have
    const GEOMETRY_TYPE: GeometryType;

    /// Label used in messages ("Point not found")
    const LABEL: &'static str;

    /// Validate and encode external coordinates
    fn encode(coordinates: &Self::Coordinates) -> GeometryResult<GeometryLiteral>;
}

/// Point features: a single `[lon, lat]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointKind;

impl GeometryKind for PointKind {
    type Coordinates = Vec<f64>;

    const TABLE: FeatureTable = FeatureTable::Points;
    const GEOMETRY_TYPE: GeometryType = GeometryType::Point;
    const LABEL: &'static str = "Point";

    fn encode(coordinates: &Self::Coordinates) -> GeometryResult<GeometryLiteral> {
        encode_point(coordinates)
    }
}

/// Polygon features: one ring of `[lon, lat]` pairs, closed on encode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolygonKind;

impl GeometryKind for PolygonKind {
    type Coordinates = Vec<Vec<f64>>;

    const TABLE: FeatureTable = FeatureTable::Polygons;
    const GEOMETRY_TYPE: GeometryType = GeometryType::Polygon;
    const LABEL: &'static str = "Polygon";

    fn encode(coordinates: &Self::Coordinates) -> GeometryResult<GeometryLiteral> {
        encode_polygon(coordinates)
    }
}
