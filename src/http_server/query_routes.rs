//! Spatial query routes

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::feature::{to_feature_collection, to_feature_with_distance, FeatureCollection};
use crate::store::FeatureId;

use super::errors::{ApiError, ApiResult};
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RadiusQuery {
    pub lon: f64,
    pub lat: f64,
    /// Meters
    pub radius: f64,
}

#[derive(Debug, Deserialize)]
pub struct PointQuery {
    pub lon: f64,
    pub lat: f64,
}

/// `coordinates` is a JSON array of `[lon, lat]` pairs
#[derive(Debug, Deserialize)]
pub struct RingQuery {
    pub coordinates: String,
}

impl RingQuery {
    fn ring(&self) -> ApiResult<Vec<Vec<f64>>> {
        serde_json::from_str(&self.coordinates)
            .map_err(|e| ApiError::InvalidQueryParam(format!("coordinates: {}", e)))
    }
}

pub fn query_routes() -> Router<AppState> {
    Router::new()
        .route("/api/points/search/radius", get(radius_handler))
        .route("/api/polygons/{id}/points", get(points_in_polygon_handler))
        .route("/api/polygons/intersect", get(intersect_handler))
        .route("/api/polygons/contains", get(contains_handler))
        .route("/api/geo/intersect", get(intersect_handler))
}

async fn radius_handler(
    State(state): State<AppState>,
    query: Result<Query<RadiusQuery>, QueryRejection>,
) -> ApiResult<Json<FeatureCollection>> {
    let Query(query) = query?;
    let hits = state
        .queries
        .points_within_radius(query.lon, query.lat, query.radius)
        .await?;

    let features = hits
        .iter()
        .map(|hit| to_feature_with_distance(&hit.record, hit.distance))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(FeatureCollection::new(features)))
}

async fn points_in_polygon_handler(
    State(state): State<AppState>,
    id: Result<Path<FeatureId>, PathRejection>,
) -> ApiResult<Json<FeatureCollection>> {
    let Path(id) = id?;
    let points = state.queries.points_within_polygon(id).await?;
    Ok(Json(to_feature_collection(&points)?))
}

async fn intersect_handler(
    State(state): State<AppState>,
    query: Result<Query<RingQuery>, QueryRejection>,
) -> ApiResult<Json<FeatureCollection>> {
    let Query(query) = query?;
    let ring = query.ring()?;
    let polygons = state.queries.intersecting_polygons(&ring).await?;
    Ok(Json(to_feature_collection(&polygons)?))
}

async fn contains_handler(
    State(state): State<AppState>,
    query: Result<Query<PointQuery>, QueryRejection>,
) -> ApiResult<Json<FeatureCollection>> {
    let Query(query) = query?;
    let polygons = state
        .queries
        .polygons_containing_point(query.lon, query.lat)
        .await?;
    Ok(Json(to_feature_collection(&polygons)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_query_parses_json() {
        let query = RingQuery {
            coordinates: "[[7,7],[7,12],[12,12],[12,7]]".into(),
        };
        assert_eq!(query.ring().unwrap().len(), 4);
    }

    #[test]
    fn test_ring_query_rejects_garbage() {
        let query = RingQuery {
            coordinates: "[[7,7],".into(),
        };
        assert!(matches!(query.ring(), Err(ApiError::InvalidQueryParam(_))));
    }
}
