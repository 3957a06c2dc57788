//! Generic repository over one feature table

use std::marker::PhantomData;
use std::sync::Arc;

use crate::feature::{
    FeatureCreate, FeatureError, FeatureRecord, FeatureResult, FeatureUpdate, GeometryKind,
    PointKind, PolygonKind,
};
use crate::observability::{log_event, Event, ObservationScope};
use crate::store::{FeatureId, SpatialPredicate, SpatialStore, StoreTransaction};

use super::params::{ListParams, DEFAULT_MAX_LIST_LIMIT};

pub type PointRepository = FeatureRepository<PointKind>;
pub type PolygonRepository = FeatureRepository<PolygonKind>;

/// A predicate hit; `distance` in meters for distance predicates
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatch<K: GeometryKind> {
    pub record: FeatureRecord<K>,
    pub distance: Option<f64>,
}

/// Store operations for features of kind `K`
pub struct FeatureRepository<K: GeometryKind> {
    store: Arc<dyn SpatialStore>,
    max_list_limit: usize,
    kind: PhantomData<K>,
}

impl<K: GeometryKind> Clone for FeatureRepository<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            max_list_limit: self.max_list_limit,
            kind: PhantomData,
        }
    }
}

impl<K: GeometryKind> FeatureRepository<K> {
    pub fn new(store: Arc<dyn SpatialStore>) -> Self {
        Self {
            store,
            max_list_limit: DEFAULT_MAX_LIST_LIMIT,
            kind: PhantomData,
        }
    }

    /// Cap on the page size `list` accepts
    pub fn with_max_list_limit(mut self, max_list_limit: usize) -> Self {
        self.max_list_limit = max_list_limit;
        self
    }

    pub fn max_list_limit(&self) -> usize {
        self.max_list_limit
    }

    /// Validate, encode and insert one feature
    pub async fn create(&self, input: FeatureCreate<K>) -> FeatureResult<FeatureRecord<K>> {
        let row = input.into_row()?;

        let mut tx = self.store.begin().await?;
        let stored = match tx.insert(K::TABLE, row).await {
            Ok(stored) => stored,
            Err(e) => return self.abort(tx, "create", e.into()).await,
        };
        tx.commit().await?;

        let id = stored.id.to_string();
        log_event(
            Event::FeatureCreated,
            &[("table", K::TABLE.table_name()), ("id", &id)],
        );
        Ok(stored.into())
    }

    /// Insert every feature or none
    ///
    /// The first failing entity aborts the batch; its error is returned
    /// as is.
    pub async fn create_batch(
        &self,
        inputs: Vec<FeatureCreate<K>>,
    ) -> FeatureResult<Vec<FeatureRecord<K>>> {
        let size = inputs.len().to_string();
        let scope = ObservationScope::with_fields(
            "BATCH_CREATE",
            &[("table", K::TABLE.table_name()), ("size", &size)],
        );

        let mut tx = match self.store.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                scope.fail(&e.to_string());
                return Err(e.into());
            }
        };

        let mut created = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            let inserted = match input.into_row() {
                Ok(row) => tx.insert(K::TABLE, row).await.map_err(FeatureError::from),
                Err(e) => Err(e),
            };
            match inserted {
                Ok(stored) => created.push(FeatureRecord::from(stored)),
                Err(e) => {
                    scope.fail(&format!("entity {}: {}", index, e));
                    return self.abort(tx, "create_batch", e).await;
                }
            }
        }

        if let Err(e) = tx.commit().await {
            scope.fail(&e.to_string());
            return Err(e.into());
        }

        let rows = created.len().to_string();
        log_event(
            Event::BatchCreated,
            &[("table", K::TABLE.table_name()), ("rows", &rows)],
        );
        scope.complete_with_fields(&[("rows", &rows)]);
        Ok(created)
    }

    pub async fn get(&self, id: FeatureId) -> FeatureResult<FeatureRecord<K>> {
        self.store
            .fetch(K::TABLE, id)
            .await?
            .map(FeatureRecord::from)
            .ok_or_else(|| FeatureError::not_found(K::LABEL, id))
    }

    /// Ordered by id
    pub async fn list(&self, params: &ListParams) -> FeatureResult<Vec<FeatureRecord<K>>> {
        let query = params.resolve(self.max_list_limit)?;
        let rows = self.store.list(K::TABLE, &query).await?;
        Ok(rows.into_iter().map(FeatureRecord::from).collect())
    }

    /// Overwrite the supplied fields
    ///
    /// An update that supplies nothing, or only values already stored,
    /// returns the current record and leaves `updated_at` alone.
    pub async fn update(
        &self,
        id: FeatureId,
        update: FeatureUpdate<K>,
    ) -> FeatureResult<FeatureRecord<K>> {
        let patch = update.into_patch()?;
        if patch.is_empty() {
            return self.get(id).await;
        }

        let mut tx = self.store.begin().await?;
        let current = match tx.fetch(K::TABLE, id).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                return self
                    .abort(tx, "update", FeatureError::not_found(K::LABEL, id))
                    .await
            }
            Err(e) => return self.abort(tx, "update", e.into()).await,
        };

        let patch = patch.retain_changes(&current);
        if patch.is_empty() {
            tx.commit().await?;
            return Ok(current.into());
        }

        let updated = match tx.update(K::TABLE, id, patch).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                return self
                    .abort(tx, "update", FeatureError::not_found(K::LABEL, id))
                    .await
            }
            Err(e) => return self.abort(tx, "update", e.into()).await,
        };
        tx.commit().await?;

        let id = id.to_string();
        log_event(
            Event::FeatureUpdated,
            &[("table", K::TABLE.table_name()), ("id", &id)],
        );
        Ok(updated.into())
    }

    pub async fn delete(&self, id: FeatureId) -> FeatureResult<()> {
        let mut tx = self.store.begin().await?;
        match tx.delete(K::TABLE, id).await {
            Ok(true) => {}
            Ok(false) => {
                return self
                    .abort(tx, "delete", FeatureError::not_found(K::LABEL, id))
                    .await
            }
            Err(e) => return self.abort(tx, "delete", e.into()).await,
        }
        tx.commit().await?;

        let id = id.to_string();
        log_event(
            Event::FeatureDeleted,
            &[("table", K::TABLE.table_name()), ("id", &id)],
        );
        Ok(())
    }

    /// Features of this kind satisfying a store predicate, in store order
    pub async fn matching(
        &self,
        predicate: &SpatialPredicate,
    ) -> FeatureResult<Vec<FeatureMatch<K>>> {
        let matches = self.store.query(K::TABLE, predicate).await?;

        let count = matches.len().to_string();
        log_event(
            Event::SpatialQueryExecuted,
            &[
                ("backend", self.store.backend_name()),
                ("matches", &count),
                ("predicate", predicate.function_name()),
                ("table", K::TABLE.table_name()),
            ],
        );

        Ok(matches
            .into_iter()
            .map(|m| FeatureMatch {
                record: FeatureRecord::from(m.row),
                distance: m.distance,
            })
            .collect())
    }

    /// Roll back and surface `cause`; a failed rollback is logged, not returned
    async fn abort<T>(
        &self,
        tx: Box<dyn StoreTransaction>,
        operation: &str,
        cause: FeatureError,
    ) -> FeatureResult<T> {
        match tx.rollback().await {
            Ok(()) => log_event(
                Event::TransactionRolledBack,
                &[
                    ("code", cause.code()),
                    ("operation", operation),
                    ("table", K::TABLE.table_name()),
                ],
            ),
            Err(e) => log_event(
                Event::RollbackFailed,
                &[
                    ("cause", &cause.to_string()),
                    ("operation", operation),
                    ("reason", &e.to_string()),
                    ("table", K::TABLE.table_name()),
                ],
            ),
        }
        Err(cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{PointCreate, PolygonCreate};
    use crate::geometry::GeometryError;
    use crate::repository::ListParams;
    use crate::store::{Attributes, FeatureTable, MemoryStore};
    use serde_json::json;

    fn attributes(value: serde_json::Value) -> Attributes {
        value.as_object().cloned().unwrap_or_default()
    }

    fn repos() -> (MemoryStore, PointRepository, PolygonRepository) {
        let store = MemoryStore::new();
        let shared: Arc<dyn SpatialStore> = Arc::new(store.clone());
        (
            store,
            FeatureRepository::new(Arc::clone(&shared)),
            FeatureRepository::new(shared),
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_, points, _) = repos();
        let created = points
            .create(PointCreate::new("Test Point", vec![10.0, 20.0]).with_description("d"))
            .await
            .unwrap();

        let fetched = points.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.geometry.wkt, "POINT(10 20)");
        assert!(fetched.updated_at >= fetched.created_at);
    }

    #[tokio::test]
    async fn test_invalid_create_touches_nothing() {
        let (store, points, _) = repos();
        let result = points.create(PointCreate::new("bad", vec![200.0, 0.0])).await;
        assert!(matches!(
            result,
            Err(FeatureError::Geometry(GeometryError::LongitudeOutOfRange(_)))
        ));
        assert_eq!(store.row_count(FeatureTable::Points).await, 0);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (_, _, polygons) = repos();
        let err = polygons.get(99).await.unwrap_err();
        assert_eq!(err.to_string(), "Polygon 99 not found");
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        let (store, points, _) = repos();
        let result = points
            .create_batch(vec![
                PointCreate::new("ok", vec![1.0, 1.0]),
                PointCreate::new("bad", vec![200.0, 1.0]),
            ])
            .await;

        assert!(matches!(
            result,
            Err(FeatureError::Geometry(GeometryError::LongitudeOutOfRange(v))) if v == 200.0
        ));
        assert_eq!(store.row_count(FeatureTable::Points).await, 0);
    }

    #[tokio::test]
    async fn test_batch_all_committed() {
        let (_, _, polygons) = repos();
        let created = polygons
            .create_batch(vec![
                PolygonCreate::new(
                    "a",
                    vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
                ),
                PolygonCreate::new(
                    "b",
                    vec![vec![2.0, 2.0], vec![2.0, 3.0], vec![3.0, 3.0], vec![2.0, 2.0]],
                ),
            ])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert!(created[0].id < created[1].id);

        let listed = polygons.list(&ListParams::default()).await.unwrap();
        assert_eq!(listed, created);
    }

    #[tokio::test]
    async fn test_empty_update_keeps_timestamp() {
        let (_, points, _) = repos();
        let created = points
            .create(PointCreate::new("p", vec![1.0, 2.0]))
            .await
            .unwrap();
        let same = points
            .update(created.id, FeatureUpdate::default())
            .await
            .unwrap();
        assert_eq!(same, created);
    }

    #[tokio::test]
    async fn test_unchanged_update_keeps_timestamp() {
        let (_, points, _) = repos();
        let created = points
            .create(
                PointCreate::new("p", vec![1.0, 2.0])
                    .with_description("d")
                    .with_attributes(attributes(json!({"k": 1}))),
            )
            .await
            .unwrap();

        let same = points
            .update(
                created.id,
                FeatureUpdate::default()
                    .name("p")
                    .description("d")
                    .attributes(attributes(json!({"k": 1})))
                    .coordinates(vec![1.0, 2.0]),
            )
            .await
            .unwrap();
        assert_eq!(same, created);

        let renamed = points
            .update(created.id, FeatureUpdate::default().name("p").description("e"))
            .await
            .unwrap();
        assert_eq!(renamed.description.as_deref(), Some("e"));
        assert!(renamed.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let (_, points, _) = repos();
        let result = points
            .update(5, FeatureUpdate::default().name("renamed"))
            .await;
        assert!(matches!(result, Err(FeatureError::NotFound { id: 5, .. })));
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let (_, points, _) = repos();
        let created = points
            .create(PointCreate::new("p", vec![1.0, 2.0]))
            .await
            .unwrap();
        points.delete(created.id).await.unwrap();
        assert!(matches!(
            points.get(created.id).await,
            Err(FeatureError::NotFound { .. })
        ));
        assert!(matches!(
            points.delete(created.id).await,
            Err(FeatureError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_limit_cap() {
        let (_, points, _) = repos();
        let points = points.with_max_list_limit(10);
        let result = points.list(&ListParams::default().limit(11)).await;
        assert!(matches!(result, Err(FeatureError::LimitExceeded(11, 10))));
    }
}
