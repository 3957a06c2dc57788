//! Geometry Codec Tests
//!
//! - Points round-trip through encode and decode
//! - Open rings are closed, identically for every caller
//! - Out-of-range coordinates are rejected for points and polygons

use geofeature::geometry::{
    decode, encode_point, encode_polygon, GeoJsonGeometry, GeometryError, StoredGeometry,
};

fn round_trip_point(lon: f64, lat: f64) -> [f64; 2] {
    let literal = encode_point(&[lon, lat]).unwrap();
    match decode(&StoredGeometry::from(&literal)).unwrap() {
        GeoJsonGeometry::Point(coords) => coords,
        other => panic!("expected point, got {:?}", other),
    }
}

fn decoded_ring(ring: &[Vec<f64>]) -> Vec<[f64; 2]> {
    let literal = encode_polygon(ring).unwrap();
    match decode(&StoredGeometry::from(&literal)).unwrap() {
        GeoJsonGeometry::Polygon(mut rings) => rings.remove(0),
        other => panic!("expected polygon, got {:?}", other),
    }
}

// =============================================================================
// Points
// =============================================================================

#[test]
fn test_point_round_trip() {
    let samples = [
        (0.0, 0.0),
        (10.0, 20.5),
        (-73.985_656, 40.748_433),
        (180.0, 90.0),
        (-180.0, -90.0),
        (139.691_706, 35.689_487),
        (0.000_001, -0.000_001),
    ];
    for (lon, lat) in samples {
        let [dlon, dlat] = round_trip_point(lon, lat);
        assert!((dlon - lon).abs() < 1e-12, "lon {} -> {}", lon, dlon);
        assert!((dlat - lat).abs() < 1e-12, "lat {} -> {}", lat, dlat);
    }
}

#[test]
fn test_point_keeps_longitude_first() {
    let literal = encode_point(&[10.0, 20.5]).unwrap();
    assert_eq!(literal.wkt(), "POINT(10 20.5)");
    assert_eq!(literal.srid(), 4326);
    assert_eq!(round_trip_point(10.0, 20.5), [10.0, 20.5]);
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
fn test_point_bounds() {
    for lon in [180.000_1, -180.000_1, 200.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            encode_point(&[lon, 0.0]),
            Err(GeometryError::LongitudeOutOfRange(_))
        ));
    }
    for lat in [90.000_1, -90.000_1, 95.0, f64::NEG_INFINITY] {
        assert!(matches!(
            encode_point(&[0.0, lat]),
            Err(GeometryError::LatitudeOutOfRange(_))
        ));
    }
}

// =============================================================================
// Polygons
// =============================================================================

#[test]
fn test_open_ring_is_closed() {
    let ring = decoded_ring(&[vec![0.0, 0.0], vec![0.0, 10.0], vec![10.0, 10.0], vec![10.0, 0.0]]);
    assert_eq!(ring.len(), 5);
    assert_eq!(ring.first(), ring.last());
    assert_eq!(ring[0], [0.0, 0.0]);
}

#[test]
fn test_closed_ring_is_unchanged() {
    let input = vec![
        vec![0.0, 0.0],
        vec![0.0, 10.0],
        vec![10.0, 10.0],
        vec![10.0, 0.0],
        vec![0.0, 0.0],
    ];
    let ring = decoded_ring(&input);
    let expected: Vec<[f64; 2]> = input.iter().map(|p| [p[0], p[1]]).collect();
    assert_eq!(ring, expected);
}

#[test]
fn test_triangle_is_smallest_ring() {
    let ring = decoded_ring(&[vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]]);
    assert_eq!(ring.len(), 4);
    assert_eq!(ring.first(), ring.last());
}

#[test]
fn test_ring_too_short() {
    assert_eq!(
        encode_polygon(&[vec![0.0, 0.0], vec![1.0, 1.0]]),
        Err(GeometryError::TooFewPositions(2))
    );
    assert_eq!(
        encode_polygon(&[vec![0.0, 0.0], vec![1.0, 1.0], vec![0.0, 0.0]]),
        Err(GeometryError::DegenerateRing)
    );
}

#[test]
fn test_ring_bounds_checked_per_position() {
    let ring = vec![vec![0.0, 0.0], vec![0.0, 10.0], vec![181.0, 10.0]];
    assert_eq!(
        encode_polygon(&ring),
        Err(GeometryError::LongitudeOutOfRange(181.0))
    );

    let ring = vec![vec![0.0, 0.0], vec![0.0, -91.0], vec![10.0, 10.0]];
    assert_eq!(
        encode_polygon(&ring),
        Err(GeometryError::LatitudeOutOfRange(-91.0))
    );

    let ring = vec![vec![0.0, 0.0], vec![0.0], vec![10.0, 10.0]];
    assert_eq!(encode_polygon(&ring), Err(GeometryError::WrongArity(1)));
}

#[test]
fn test_encoding_is_deterministic() {
    let ring = vec![vec![1.5, 2.5], vec![3.5, 2.5], vec![3.5, 4.5]];
    let first = encode_polygon(&ring).unwrap();
    for _ in 0..10 {
        assert_eq!(encode_polygon(&ring).unwrap(), first);
    }
}

// =============================================================================
// Decoding stored text
// =============================================================================

#[test]
fn test_decode_extended_wkt() {
    let stored = StoredGeometry::new("SRID=4326;POINT(-0.1276 51.5072)", 4326);
    assert_eq!(
        decode(&stored).unwrap(),
        GeoJsonGeometry::Point([-0.1276, 51.5072])
    );
}

#[test]
fn test_decode_rejects_other_types() {
    let stored = StoredGeometry::new("LINESTRING(0 0, 1 1)", 4326);
    assert!(matches!(
        decode(&stored),
        Err(GeometryError::UnexpectedGeometry { .. })
    ));
}
