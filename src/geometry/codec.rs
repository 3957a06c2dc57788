//! Coordinate validation and WKT encoding

use std::fmt;

use super::errors::{GeometryError, GeometryResult};

/// Spatial reference id of every stored geometry (WGS84)
pub const WGS84_SRID: i32 = 4326;

/// Minimum number of positions in a closed ring
pub const MIN_RING_POSITIONS: usize = 4;

/// Minimum number of positions a caller must supply for a polygon
const MIN_INPUT_POSITIONS: usize = 3;

/// A validated `[longitude, latitude]` pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    lon: f64,
    lat: f64,
}

impl Position {
    /// Validate and build a position
    ///
    /// NaN fails both range checks and is rejected as out of range.
    pub fn new(lon: f64, lat: f64) -> GeometryResult<Self> {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(GeometryError::LongitudeOutOfRange(lon));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeometryError::LatitudeOutOfRange(lat));
        }
        Ok(Self { lon, lat })
    }

    /// Validate a raw coordinate array, which must hold exactly two values
    pub fn from_slice(values: &[f64]) -> GeometryResult<Self> {
        match values {
            [lon, lat] => Self::new(*lon, *lat),
            other => Err(GeometryError::WrongArity(other.len())),
        }
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// External array form, longitude first
    pub fn to_array(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl fmt::Display for Position {
    /// WKT coordinate form: `lon lat`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.lon, self.lat)
    }
}

/// Geometry text ready to hand to the store, always tagged with an SRID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryLiteral {
    wkt: String,
    srid: i32,
}

impl GeometryLiteral {
    pub(crate) fn wgs84(wkt: String) -> Self {
        Self {
            wkt,
            srid: WGS84_SRID,
        }
    }

    pub fn wkt(&self) -> &str {
        &self.wkt
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }
}

impl fmt::Display for GeometryLiteral {
    /// Extended WKT: `SRID=4326;POINT(1 2)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SRID={};{}", self.srid, self.wkt)
    }
}

/// Encode a `[longitude, latitude]` pair as a point literal
pub fn encode_point(coordinates: &[f64]) -> GeometryResult<GeometryLiteral> {
    let position = Position::from_slice(coordinates)?;
    Ok(GeometryLiteral::wgs84(format!("POINT({})", position)))
}

/// Encode a ring of `[longitude, latitude]` pairs as a polygon literal
///
/// An open ring is closed by appending its first position. The same
/// normalization applies whether the ring comes from a create, an update
/// or a query polygon.
pub fn encode_polygon(ring: &[Vec<f64>]) -> GeometryResult<GeometryLiteral> {
    if ring.len() < MIN_INPUT_POSITIONS {
        return Err(GeometryError::TooFewPositions(ring.len()));
    }

    let positions = ring
        .iter()
        .map(|pair| Position::from_slice(pair))
        .collect::<GeometryResult<Vec<_>>>()?;
    let closed = close_ring(positions);

    if closed.len() < MIN_RING_POSITIONS {
        return Err(GeometryError::DegenerateRing);
    }

    let body = closed
        .iter()
        .map(Position::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Ok(GeometryLiteral::wgs84(format!("POLYGON(({}))", body)))
}

/// Append the first position if the ring is open
pub fn close_ring(mut positions: Vec<Position>) -> Vec<Position> {
    if let (Some(first), Some(last)) = (positions.first().copied(), positions.last()) {
        if first != *last {
            positions.push(first);
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_point() {
        let literal = encode_point(&[10.0, 20.5]).unwrap();
        assert_eq!(literal.wkt(), "POINT(10 20.5)");
        assert_eq!(literal.srid(), WGS84_SRID);
        assert_eq!(literal.to_string(), "SRID=4326;POINT(10 20.5)");
    }

    #[test]
    fn test_point_bounds_are_inclusive() {
        assert!(encode_point(&[180.0, 90.0]).is_ok());
        assert!(encode_point(&[-180.0, -90.0]).is_ok());
    }

    #[test]
    fn test_point_arity() {
        assert_eq!(encode_point(&[1.0]), Err(GeometryError::WrongArity(1)));
        assert_eq!(
            encode_point(&[1.0, 2.0, 3.0]),
            Err(GeometryError::WrongArity(3))
        );
        assert_eq!(encode_point(&[]), Err(GeometryError::WrongArity(0)));
    }

    #[test]
    fn test_point_rejects_nan() {
        assert!(matches!(
            encode_point(&[f64::NAN, 0.0]),
            Err(GeometryError::LongitudeOutOfRange(_))
        ));
        assert!(matches!(
            encode_point(&[0.0, f64::INFINITY]),
            Err(GeometryError::LatitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_encode_polygon_closes_ring() {
        let ring = vec![vec![0.0, 0.0], vec![0.0, 10.0], vec![10.0, 10.0]];
        let literal = encode_polygon(&ring).unwrap();
        assert_eq!(literal.wkt(), "POLYGON((0 0, 0 10, 10 10, 0 0))");
    }

    #[test]
    fn test_encode_polygon_keeps_closed_ring() {
        let ring = vec![
            vec![0.0, 0.0],
            vec![0.0, 10.0],
            vec![10.0, 10.0],
            vec![0.0, 0.0],
        ];
        let literal = encode_polygon(&ring).unwrap();
        assert_eq!(literal.wkt(), "POLYGON((0 0, 0 10, 10 10, 0 0))");
    }

    #[test]
    fn test_encode_polygon_validates_every_position() {
        let ring = vec![vec![0.0, 0.0], vec![0.0, 95.0], vec![10.0, 10.0]];
        assert_eq!(
            encode_polygon(&ring),
            Err(GeometryError::LatitudeOutOfRange(95.0))
        );

        let ring = vec![vec![0.0, 0.0], vec![0.0], vec![10.0, 10.0]];
        assert_eq!(encode_polygon(&ring), Err(GeometryError::WrongArity(1)));
    }

    #[test]
    fn test_encode_polygon_too_few() {
        let ring = vec![vec![0.0, 0.0], vec![1.0, 1.0]];
        assert_eq!(encode_polygon(&ring), Err(GeometryError::TooFewPositions(2)));
    }

    #[test]
    fn test_encode_polygon_degenerate() {
        let ring = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![0.0, 0.0]];
        assert_eq!(encode_polygon(&ring), Err(GeometryError::DegenerateRing));
    }

    #[test]
    fn test_close_ring_empty() {
        assert!(close_ring(Vec::new()).is_empty());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let ring = vec![vec![1.5, 2.25], vec![3.0, 4.0], vec![5.0, 0.125]];
        assert_eq!(encode_polygon(&ring), encode_polygon(&ring));
    }
}
