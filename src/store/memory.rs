//! # In-Memory Store
//!
//! A process-local stand-in for the database, used by the test suite and
//! the `memory` backend. Transactions stage their changes on a private
//! working copy and publish it on commit; writers are serialized, so
//! concurrent updates resolve last-write-wins. Ids come from a sequence
//! that never rewinds, not even on rollback.
//!
//! Spatial predicates are evaluated with `geo` using DE-9IM relations
//! (boundary points are not `within`) and geodesic distance on WGS84,
//! mirroring the PostGIS functions the real store uses.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use geo::{GeodesicDistance, Relate};
use geo_types::Geometry;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::geometry::{parse_stored, GeometryError, StoredGeometry};

use super::errors::{StoreError, StoreResult};
use super::row::{
    FeatureId, FeatureTable, ListQuery, NewRow, RowPatch, SpatialMatch, SpatialPredicate,
    StoredRow,
};
use super::{SpatialStore, StoreTransaction};

#[derive(Debug, Default, Clone)]
struct Tables {
    points: BTreeMap<FeatureId, StoredRow>,
    polygons: BTreeMap<FeatureId, StoredRow>,
}

impl Tables {
    fn table(&self, table: FeatureTable) -> &BTreeMap<FeatureId, StoredRow> {
        match table {
            FeatureTable::Points => &self.points,
            FeatureTable::Polygons => &self.polygons,
        }
    }

    fn table_mut(&mut self, table: FeatureTable) -> &mut BTreeMap<FeatureId, StoredRow> {
        match table {
            FeatureTable::Points => &mut self.points,
            FeatureTable::Polygons => &mut self.polygons,
        }
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    committed: Arc<RwLock<Tables>>,
    writer: Arc<Mutex<()>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed rows in a table
    pub async fn row_count(&self, table: FeatureTable) -> usize {
        self.committed.read().await.table(table).len()
    }
}

#[async_trait]
impl SpatialStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let guard = Arc::clone(&self.writer).lock_owned().await;
        let working = self.committed.read().await.clone();
        Ok(Box::new(MemoryTransaction {
            working,
            committed: Arc::clone(&self.committed),
            next_id: Arc::clone(&self.next_id),
            _writer: guard,
        }))
    }

    async fn fetch(&self, table: FeatureTable, id: FeatureId) -> StoreResult<Option<StoredRow>> {
        Ok(self.committed.read().await.table(table).get(&id).cloned())
    }

    async fn list(&self, table: FeatureTable, query: &ListQuery) -> StoreResult<Vec<StoredRow>> {
        let needle = query.name_contains.as_ref().map(|s| s.to_lowercase());
        let tables = self.committed.read().await;

        Ok(tables
            .table(table)
            .values()
            .filter(|row| match &needle {
                Some(needle) => row.name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn query(
        &self,
        table: FeatureTable,
        predicate: &SpatialPredicate,
    ) -> StoreResult<Vec<SpatialMatch>> {
        let operand_literal = predicate.operand();
        let operand = parse_stored(&StoredGeometry::from(operand_literal))?;
        let tables = self.committed.read().await;

        let mut matches = Vec::new();
        for row in tables.table(table).values() {
            if row.geometry.srid != operand_literal.srid() {
                return Err(StoreError::Geometry(GeometryError::SridMismatch(
                    operand_literal.srid(),
                )));
            }
            let geometry = parse_stored(&row.geometry)?;

            let hit = match predicate {
                SpatialPredicate::Within(_) => geometry.relate(&operand).is_within(),
                SpatialPredicate::Intersects(_) => geometry.relate(&operand).is_intersects(),
                SpatialPredicate::Contains(_) => geometry.relate(&operand).is_contains(),
                SpatialPredicate::DWithin { radius_meters, .. } => {
                    let distance = geodesic_distance(&geometry, &operand)?;
                    if distance <= *radius_meters {
                        matches.push(SpatialMatch {
                            row: row.clone(),
                            distance: Some(distance),
                        });
                    }
                    continue;
                }
            };

            if hit {
                matches.push(SpatialMatch {
                    row: row.clone(),
                    distance: None,
                });
            }
        }

        if matches!(predicate, SpatialPredicate::DWithin { .. }) {
            matches.sort_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.row.id.cmp(&b.row.id))
            });
        }

        Ok(matches)
    }

    async fn migrate(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

fn geodesic_distance(a: &Geometry<f64>, b: &Geometry<f64>) -> StoreResult<f64> {
    match (a, b) {
        (Geometry::Point(a), Geometry::Point(b)) => Ok(a.geodesic_distance(b)),
        _ => Err(StoreError::Query(
            "distance predicates are only supported between points".to_string(),
        )),
    }
}

struct MemoryTransaction {
    working: Tables,
    committed: Arc<RwLock<Tables>>,
    next_id: Arc<AtomicI64>,
    _writer: OwnedMutexGuard<()>,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn insert(&mut self, table: FeatureTable, row: NewRow) -> StoreResult<StoredRow> {
        // Same check the geometry column's SRID constraint makes
        parse_stored(&StoredGeometry::from(&row.geometry))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let stored = StoredRow {
            id,
            name: row.name,
            description: row.description,
            attributes: row.attributes,
            geometry: StoredGeometry::from(&row.geometry),
            created_at: now,
            updated_at: now,
        };
        self.working.table_mut(table).insert(id, stored.clone());
        Ok(stored)
    }

    async fn fetch(&mut self, table: FeatureTable, id: FeatureId) -> StoreResult<Option<StoredRow>> {
        Ok(self.working.table(table).get(&id).cloned())
    }

    async fn update(
        &mut self,
        table: FeatureTable,
        id: FeatureId,
        patch: RowPatch,
    ) -> StoreResult<Option<StoredRow>> {
        let Some(row) = self.working.table_mut(table).get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(description) = patch.description {
            row.description = Some(description);
        }
        if let Some(attributes) = patch.attributes {
            row.attributes = Some(attributes);
        }
        if let Some(geometry) = patch.geometry {
            parse_stored(&StoredGeometry::from(&geometry))?;
            row.geometry = StoredGeometry::from(&geometry);
        }
        row.updated_at = Utc::now().max(row.created_at);

        Ok(Some(row.clone()))
    }

    async fn delete(&mut self, table: FeatureTable, id: FeatureId) -> StoreResult<bool> {
        Ok(self.working.table_mut(table).remove(&id).is_some())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let this = *self;
        *this.committed.write().await = this.working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
