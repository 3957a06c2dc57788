//! Shared handler state

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::query::SpatialQueries;
use crate::repository::{FeatureRepository, PointRepository, PolygonRepository};
use crate::store::SpatialStore;

#[derive(Clone)]
pub struct AppState {
    pub points: PointRepository,
    pub polygons: PolygonRepository,
    pub queries: SpatialQueries,
    pub backend: &'static str,
    /// Add source chains to 500 responses
    pub debug: bool,
}

impl AppState {
    pub fn new(config: &ServiceConfig, store: Arc<dyn SpatialStore>) -> Self {
        let backend = store.backend_name();
        let points = FeatureRepository::new(Arc::clone(&store))
            .with_max_list_limit(config.max_list_limit);
        let polygons = FeatureRepository::new(store).with_max_list_limit(config.max_list_limit);
        let queries = SpatialQueries::new(points.clone(), polygons.clone());

        Self {
            points,
            polygons,
            queries,
            backend,
            debug: config.debug,
        }
    }
}
