//! Decoding stored geometry into GeoJSON geometry objects

use std::fmt;
use std::str::FromStr;

use geo_types::Geometry;
use serde::{Deserialize, Serialize};

use super::codec::{GeometryLiteral, WGS84_SRID};
use super::errors::{GeometryError, GeometryResult};

/// Geometry as the store hands it back: WKT text plus its SRID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredGeometry {
    pub wkt: String,
    pub srid: i32,
}

impl StoredGeometry {
    pub fn new(wkt: impl Into<String>, srid: i32) -> Self {
        Self {
            wkt: wkt.into(),
            srid,
        }
    }

    /// Turn a stored geometry back into a literal usable in a predicate
    ///
    /// Fails on anything other than WGS84 so that no mixed-SRID
    /// comparison is ever issued.
    pub fn to_literal(&self) -> GeometryResult<GeometryLiteral> {
        if self.srid != WGS84_SRID {
            return Err(GeometryError::SridMismatch(self.srid));
        }
        Ok(GeometryLiteral::wgs84(strip_srid(&self.wkt).to_string()))
    }
}

impl From<&GeometryLiteral> for StoredGeometry {
    fn from(literal: &GeometryLiteral) -> Self {
        Self::new(literal.wkt(), literal.srid())
    }
}

/// The geometry types this service stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Point,
    Polygon,
}

impl GeometryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::Polygon => "Polygon",
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GeoJSON geometry object, `{"type": ..., "coordinates": ...}`
///
/// Coordinates are always `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum GeoJsonGeometry {
    Point([f64; 2]),
    Polygon(Vec<Vec<[f64; 2]>>),
}

impl GeoJsonGeometry {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            GeoJsonGeometry::Point(_) => GeometryType::Point,
            GeoJsonGeometry::Polygon(_) => GeometryType::Polygon,
        }
    }
}

/// Parse stored geometry text into a `geo_types` geometry
pub fn parse_stored(stored: &StoredGeometry) -> GeometryResult<Geometry<f64>> {
    let wkt = wkt::Wkt::<f64>::from_str(strip_srid(&stored.wkt))
        .map_err(|e| GeometryError::MalformedWkt(format!("{:?}", e)))?;
    wkt.try_into()
        .map_err(|e: wkt::conversion::Error| GeometryError::MalformedWkt(format!("{:?}", e)))
}

/// Decode stored geometry into its GeoJSON form, with no reprojection
pub fn decode(stored: &StoredGeometry) -> GeometryResult<GeoJsonGeometry> {
    match parse_stored(stored)? {
        Geometry::Point(point) => Ok(GeoJsonGeometry::Point([point.x(), point.y()])),
        Geometry::Polygon(polygon) => {
            let rings = std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
                .collect();
            Ok(GeoJsonGeometry::Polygon(rings))
        }
        other => Err(GeometryError::UnexpectedGeometry {
            expected: "Point or Polygon",
            found: geometry_name(&other).to_string(),
        }),
    }
}

fn strip_srid(text: &str) -> &str {
    let text = text.trim();
    match text.split_once(';') {
        Some((prefix, rest)) if prefix.trim_start().to_ascii_uppercase().starts_with("SRID=") => {
            rest.trim_start()
        }
        _ => text,
    }
}

fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        _ => "Geometry",
    }
}
