//! Composite spatial queries over the point and polygon repositories

use crate::feature::{FeatureError, FeatureRecord, FeatureResult, PointKind, PolygonKind};
use crate::geometry::{encode_point, encode_polygon};
use crate::repository::{PointRepository, PolygonRepository};
use crate::store::{FeatureId, SpatialPredicate, StoreError};

/// A point found by a radius search
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusHit {
    pub record: FeatureRecord<PointKind>,
    /// Geodesic distance to the center, meters
    pub distance: f64,
}

/// Spatial queries spanning the point and polygon tables
#[derive(Clone)]
pub struct SpatialQueries {
    points: PointRepository,
    polygons: PolygonRepository,
}

impl SpatialQueries {
    pub fn new(points: PointRepository, polygons: PolygonRepository) -> Self {
        Self { points, polygons }
    }

    /// Points lying within a stored polygon
    ///
    /// Boundary points follow the store's `within` semantics.
    pub async fn points_within_polygon(
        &self,
        polygon_id: FeatureId,
    ) -> FeatureResult<Vec<FeatureRecord<PointKind>>> {
        let polygon = self.polygons.get(polygon_id).await?;
        let operand = polygon.geometry.to_literal()?;

        let matches = self
            .points
            .matching(&SpatialPredicate::Within(operand))
            .await?;
        Ok(matches.into_iter().map(|m| m.record).collect())
    }

    /// Stored polygons intersecting a ring given as raw `[lon, lat]` pairs
    ///
    /// The ring is closed automatically when open.
    pub async fn intersecting_polygons(
        &self,
        ring: &[Vec<f64>],
    ) -> FeatureResult<Vec<FeatureRecord<PolygonKind>>> {
        let operand = encode_polygon(ring)?;
        let matches = self
            .polygons
            .matching(&SpatialPredicate::Intersects(operand))
            .await?;
        Ok(matches.into_iter().map(|m| m.record).collect())
    }

    /// Stored polygons containing a point
    pub async fn polygons_containing_point(
        &self,
        lon: f64,
        lat: f64,
    ) -> FeatureResult<Vec<FeatureRecord<PolygonKind>>> {
        let operand = encode_point(&[lon, lat])?;
        let matches = self
            .polygons
            .matching(&SpatialPredicate::Contains(operand))
            .await?;
        Ok(matches.into_iter().map(|m| m.record).collect())
    }

    /// Points within `radius_meters` geodesic distance, nearest first
    pub async fn points_within_radius(
        &self,
        lon: f64,
        lat: f64,
        radius_meters: f64,
    ) -> FeatureResult<Vec<RadiusHit>> {
        if !radius_meters.is_finite() || radius_meters < 0.0 {
            return Err(FeatureError::invalid_field(
                "radius",
                format!("{} is not a finite, non-negative distance", radius_meters),
            ));
        }
        let center = encode_point(&[lon, lat])?;

        let matches = self
            .points
            .matching(&SpatialPredicate::DWithin {
                center,
                radius_meters,
            })
            .await?;

        matches
            .into_iter()
            .map(|m| match m.distance {
                Some(distance) => Ok(RadiusHit {
                    record: m.record,
                    distance,
                }),
                None => Err(StoreError::Decode(format!(
                    "no distance returned for point {}",
                    m.record.id
                ))
                .into()),
            })
            .collect()
    }
}
