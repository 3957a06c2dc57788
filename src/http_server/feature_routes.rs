//! CRUD routes, shared by points and polygons

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::feature::{
    to_feature, to_feature_collection, Feature, FeatureCollection, FeatureCreate, FeatureUpdate,
    GeometryKind, PointKind, PolygonKind,
};
use crate::repository::{FeatureRepository, ListParams};
use crate::store::FeatureId;

use super::errors::ApiResult;
use super::state::AppState;

/// Binds a geometry kind to its routes
pub trait FeatureRoutes: GeometryKind {
    /// Collection path, e.g. `/api/points`
    const BASE_PATH: &'static str;

    /// Body of the batch endpoint
    type Batch: DeserializeOwned + Send + 'static;

    fn repository(state: &AppState) -> &FeatureRepository<Self>;

    fn batch_inputs(batch: Self::Batch) -> Vec<FeatureCreate<Self>>;
}

/// `{"points": [...]}`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointBatch {
    pub points: Vec<FeatureCreate<PointKind>>,
}

/// `{"polygons": [...]}`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolygonBatch {
    pub polygons: Vec<FeatureCreate<PolygonKind>>,
}

impl FeatureRoutes for PointKind {
    const BASE_PATH: &'static str = "/api/points";
    type Batch = PointBatch;

    fn repository(state: &AppState) -> &FeatureRepository<Self> {
        &state.points
    }

    fn batch_inputs(batch: PointBatch) -> Vec<FeatureCreate<Self>> {
        batch.points
    }
}

impl FeatureRoutes for PolygonKind {
    const BASE_PATH: &'static str = "/api/polygons";
    type Batch = PolygonBatch;

    fn repository(state: &AppState) -> &FeatureRepository<Self> {
        &state.polygons
    }

    fn batch_inputs(batch: PolygonBatch) -> Vec<FeatureCreate<Self>> {
        batch.polygons
    }
}

/// Routes for one kind; `PATCH` is an alias of `PUT`
///
/// The collection is served with and without a trailing slash.
pub fn feature_routes<K: FeatureRoutes>() -> Router<AppState> {
    let base = K::BASE_PATH;
    Router::new()
        .route(base, post(create_handler::<K>).get(list_handler::<K>))
        .route(
            &format!("{}/", base),
            post(create_handler::<K>).get(list_handler::<K>),
        )
        .route(&format!("{}/batch", base), post(batch_handler::<K>))
        .route(
            &format!("{}/{{id}}", base),
            get(get_handler::<K>)
                .put(update_handler::<K>)
                .patch(update_handler::<K>)
                .delete(delete_handler::<K>),
        )
}

async fn create_handler<K: FeatureRoutes>(
    State(state): State<AppState>,
    body: Result<Json<FeatureCreate<K>>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Feature>)> {
    let Json(input) = body?;
    let record = K::repository(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(to_feature(&record)?)))
}

async fn batch_handler<K: FeatureRoutes>(
    State(state): State<AppState>,
    body: Result<Json<K::Batch>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<FeatureCollection>)> {
    let Json(batch) = body?;
    let records = K::repository(&state)
        .create_batch(K::batch_inputs(batch))
        .await?;
    Ok((StatusCode::CREATED, Json(to_feature_collection(&records)?)))
}

async fn list_handler<K: FeatureRoutes>(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<FeatureCollection>> {
    let Query(params) = params?;
    let records = K::repository(&state).list(&params).await?;
    Ok(Json(to_feature_collection(&records)?))
}

async fn get_handler<K: FeatureRoutes>(
    State(state): State<AppState>,
    id: Result<Path<FeatureId>, PathRejection>,
) -> ApiResult<Json<Feature>> {
    let Path(id) = id?;
    let record = K::repository(&state).get(id).await?;
    Ok(Json(to_feature(&record)?))
}

async fn update_handler<K: FeatureRoutes>(
    State(state): State<AppState>,
    id: Result<Path<FeatureId>, PathRejection>,
    body: Result<Json<FeatureUpdate<K>>, JsonRejection>,
) -> ApiResult<Json<Feature>> {
    let Path(id) = id?;
    let Json(update) = body?;
    let record = K::repository(&state).update(id, update).await?;
    Ok(Json(to_feature(&record)?))
}

async fn delete_handler<K: FeatureRoutes>(
    State(state): State<AppState>,
    id: Result<Path<FeatureId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    K::repository(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
