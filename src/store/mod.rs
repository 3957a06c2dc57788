//! # Backing Store
//!
//! The seam between the feature service and the persistence engine.
//! The engine owns transactions, the spatial index and every spatial
//! predicate; this module only describes what is sent and received.
//!
//! Two implementations:
//!
//! - [`PgStore`]: PostgreSQL + PostGIS through a sqlx pool
//! - [`MemoryStore`]: process-local, for tests and the `memory` backend

mod errors;
mod memory;
mod postgres;
mod row;
mod schema;

use async_trait::async_trait;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use row::{
    Attributes, FeatureId, FeatureTable, ListQuery, NewRow, RowPatch, SpatialMatch,
    SpatialPredicate, StoredRow,
};
pub use schema::{migration_statements, MIGRATION_NAME};

/// One unit of work against the store
///
/// Nothing done through a transaction is visible to other readers until
/// `commit`. Dropping a transaction without committing discards it.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Insert a row and return it with its assigned id and timestamps
    async fn insert(&mut self, table: FeatureTable, row: NewRow) -> StoreResult<StoredRow>;

    /// Read a row as seen by this transaction
    async fn fetch(&mut self, table: FeatureTable, id: FeatureId) -> StoreResult<Option<StoredRow>>;

    /// Overwrite the supplied columns and refresh `updated_at`
    ///
    /// Returns `None` if the row does not exist.
    async fn update(
        &mut self,
        table: FeatureTable,
        id: FeatureId,
        patch: RowPatch,
    ) -> StoreResult<Option<StoredRow>>;

    /// Remove a row; returns false if it did not exist
    async fn delete(&mut self, table: FeatureTable, id: FeatureId) -> StoreResult<bool>;

    /// Make every change visible
    async fn commit(self: Box<Self>) -> StoreResult<()>;

    /// Discard every change
    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// The persistence engine
#[async_trait]
pub trait SpatialStore: Send + Sync {
    /// Open a transaction
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>>;

    /// Read a committed row
    async fn fetch(&self, table: FeatureTable, id: FeatureId) -> StoreResult<Option<StoredRow>>;

    /// List committed rows ordered by id
    async fn list(&self, table: FeatureTable, query: &ListQuery) -> StoreResult<Vec<StoredRow>>;

    /// Rows of `table` satisfying a spatial predicate
    ///
    /// Ordered by id, except distance predicates which are ordered by
    /// ascending distance.
    async fn query(
        &self,
        table: FeatureTable,
        predicate: &SpatialPredicate,
    ) -> StoreResult<Vec<SpatialMatch>>;

    /// Create tables and indexes if missing
    async fn migrate(&self) -> StoreResult<()>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
