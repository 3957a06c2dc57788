//! # PostGIS Store
//!
//! sqlx-backed implementation. Geometry enters as
//! `ST_GeomFromText(wkt, srid)` and leaves as `ST_AsText` + `ST_SRID`;
//! every spatial predicate is a native PostGIS function.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder, Row, Transaction};

use crate::geometry::{GeometryLiteral, StoredGeometry};

use super::errors::{StoreError, StoreResult};
use super::row::{
    Attributes, FeatureId, FeatureTable, ListQuery, NewRow, RowPatch, SpatialMatch,
    SpatialPredicate, StoredRow,
};
use super::schema::migration_statements;
use super::{SpatialStore, StoreTransaction};

/// Columns read back for every row
const RETURNING: &str = "id, name, description, attributes, \
    ST_AsText(geom) AS geom_wkt, ST_SRID(geom) AS geom_srid, created_at, updated_at";

/// PostgreSQL + PostGIS store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SpatialStore for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to begin transaction: {e}")))?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn fetch(&self, table: FeatureTable, id: FeatureId) -> StoreResult<Option<StoredRow>> {
        let sql = select_by_id_sql(table);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(decode_row).transpose()
    }

    async fn list(&self, table: FeatureTable, query: &ListQuery) -> StoreResult<Vec<StoredRow>> {
        let mut builder = build_list(table, query);
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn query(
        &self,
        table: FeatureTable,
        predicate: &SpatialPredicate,
    ) -> StoreResult<Vec<SpatialMatch>> {
        let mut builder = build_predicate_query(table, predicate);
        let rows = builder.build().fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> StoreResult<SpatialMatch> {
                let distance = match predicate {
                    SpatialPredicate::DWithin { .. } => Some(row.try_get::<f64, _>("distance")?),
                    _ => None,
                };
                Ok(SpatialMatch {
                    row: decode_row(row)?,
                    distance,
                })
            })
            .collect()
    }

    async fn migrate(&self) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to begin migration: {e}")))?;

        for statement in migration_statements() {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to commit migration: {e}")))
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

/// A sqlx transaction; dropped without commit it rolls back
struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn insert(&mut self, table: FeatureTable, row: NewRow) -> StoreResult<StoredRow> {
        let sql = insert_sql(table);
        let stored = sqlx::query(&sql)
            .bind(row.name)
            .bind(row.description)
            .bind(row.attributes.map(Json))
            .bind(row.geometry.wkt().to_string())
            .bind(row.geometry.srid())
            .fetch_one(&mut *self.tx)
            .await?;
        decode_row(&stored)
    }

    async fn fetch(&mut self, table: FeatureTable, id: FeatureId) -> StoreResult<Option<StoredRow>> {
        let sql = select_by_id_sql(table);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(decode_row).transpose()
    }

    async fn update(
        &mut self,
        table: FeatureTable,
        id: FeatureId,
        patch: RowPatch,
    ) -> StoreResult<Option<StoredRow>> {
        let mut builder = build_update(table, id, patch);
        let row = builder.build().fetch_optional(&mut *self.tx).await?;
        row.as_ref().map(decode_row).transpose()
    }

    async fn delete(&mut self, table: FeatureTable, id: FeatureId) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table.table_name());
        let result = sqlx::query(&sql).bind(id).execute(&mut *self.tx).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to commit: {e}")))
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to roll back: {e}")))
    }
}

fn select_by_id_sql(table: FeatureTable) -> String {
    format!(
        "SELECT {} FROM {} WHERE id = $1",
        RETURNING,
        table.table_name()
    )
}

fn insert_sql(table: FeatureTable) -> String {
    format!(
        "INSERT INTO {} (name, description, attributes, geom) \
         VALUES ($1, $2, $3, ST_GeomFromText($4, $5)) RETURNING {}",
        table.table_name(),
        RETURNING
    )
}

fn push_geometry(builder: &mut QueryBuilder<'static, Postgres>, literal: &GeometryLiteral) {
    builder
        .push("ST_GeomFromText(")
        .push_bind(literal.wkt().to_string())
        .push(", ")
        .push_bind(literal.srid())
        .push(")");
}

/// UPDATE touching only the supplied columns
fn build_update(
    table: FeatureTable,
    id: FeatureId,
    patch: RowPatch,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", table.table_name()));

    if let Some(name) = patch.name {
        builder.push("name = ").push_bind(name).push(", ");
    }
    if let Some(description) = patch.description {
        builder.push("description = ").push_bind(description).push(", ");
    }
    if let Some(attributes) = patch.attributes {
        builder.push("attributes = ").push_bind(Json(attributes)).push(", ");
    }
    if let Some(geometry) = patch.geometry {
        builder.push("geom = ");
        push_geometry(&mut builder, &geometry);
        builder.push(", ");
    }

    builder
        .push("updated_at = GREATEST(now(), created_at) WHERE id = ")
        .push_bind(id)
        .push(" RETURNING ")
        .push(RETURNING);
    builder
}

/// SELECT with optional name filter, ordered by id
fn build_list(table: FeatureTable, query: &ListQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM {}",
        RETURNING,
        table.table_name()
    ));

    if let Some(fragment) = &query.name_contains {
        builder.push(" WHERE name ILIKE ").push_bind(like_pattern(fragment));
    }

    builder
        .push(" ORDER BY id OFFSET ")
        .push_bind(to_sql_count(query.offset))
        .push(" LIMIT ")
        .push_bind(to_sql_count(query.limit));
    builder
}

/// SELECT filtered by a native PostGIS predicate
fn build_predicate_query(
    table: FeatureTable,
    predicate: &SpatialPredicate,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {}", RETURNING));

    match predicate {
        SpatialPredicate::DWithin {
            center,
            radius_meters,
        } => {
            builder.push(", ST_Distance(geom::geography, ");
            push_geometry(&mut builder, center);
            builder
                .push("::geography) AS distance FROM ")
                .push(table.table_name())
                .push(" WHERE ST_DWithin(geom::geography, ");
            push_geometry(&mut builder, center);
            builder
                .push("::geography, ")
                .push_bind(*radius_meters)
                .push(") ORDER BY distance, id");
        }
        other => {
            builder
                .push(" FROM ")
                .push(table.table_name())
                .push(" WHERE ")
                .push(other.function_name())
                .push("(geom, ");
            push_geometry(&mut builder, other.operand());
            builder.push(") ORDER BY id");
        }
    }

    builder
}

/// Literal substring pattern for ILIKE: escapes `\`, `%` and `_`
fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn to_sql_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn decode_row(row: &PgRow) -> StoreResult<StoredRow> {
    let attributes: Option<Json<Attributes>> = row.try_get("attributes")?;
    let wkt: String = row.try_get("geom_wkt")?;
    let srid: i32 = row.try_get("geom_srid")?;

    Ok(StoredRow {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        attributes: attributes.map(|json| json.0),
        geometry: StoredGeometry::new(wkt, srid),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{encode_point, encode_polygon};

    fn square() -> GeometryLiteral {
        encode_polygon(&[
            vec![0.0, 0.0],
            vec![0.0, 10.0],
            vec![10.0, 10.0],
            vec![10.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_insert_sql() {
        let sql = insert_sql(FeatureTable::Points);
        assert!(sql.starts_with("INSERT INTO spatial_points"));
        assert!(sql.contains("ST_GeomFromText($4, $5)"));
        assert!(sql.contains("RETURNING id"));
    }

    #[test]
    fn test_within_query() {
        let builder =
            build_predicate_query(FeatureTable::Points, &SpatialPredicate::Within(square()));
        let sql = builder.sql();
        assert!(sql.contains("FROM spatial_points"));
        assert!(sql.contains("WHERE ST_Within(geom, ST_GeomFromText($1, $2))"));
        assert!(sql.ends_with("ORDER BY id"));
    }

    #[test]
    fn test_intersects_and_contains_queries() {
        let builder =
            build_predicate_query(FeatureTable::Polygons, &SpatialPredicate::Intersects(square()));
        assert!(builder
            .sql()
            .contains("WHERE ST_Intersects(geom, ST_GeomFromText($1, $2))"));

        let point = encode_point(&[5.0, 5.0]).unwrap();
        let builder =
            build_predicate_query(FeatureTable::Polygons, &SpatialPredicate::Contains(point));
        assert!(builder
            .sql()
            .contains("FROM spatial_polygons WHERE ST_Contains(geom, ST_GeomFromText($1, $2))"));
    }

    #[test]
    fn test_dwithin_uses_geography() {
        let center = encode_point(&[0.0, 0.0]).unwrap();
        let builder = build_predicate_query(
            FeatureTable::Points,
            &SpatialPredicate::DWithin {
                center,
                radius_meters: 1000.0,
            },
        );
        let sql = builder.sql();
        assert!(sql.contains("ST_Distance(geom::geography, ST_GeomFromText($1, $2)::geography) AS distance"));
        assert!(sql.contains("ST_DWithin(geom::geography, ST_GeomFromText($3, $4)::geography, $5)"));
        assert!(sql.ends_with("ORDER BY distance, id"));
    }

    #[test]
    fn test_update_only_supplied_columns() {
        let patch = RowPatch {
            name: Some("renamed".into()),
            ..Default::default()
        };
        let builder = build_update(FeatureTable::Points, 7, patch);
        let sql = builder.sql();
        assert!(sql.starts_with("UPDATE spatial_points SET name = $1, updated_at"));
        assert!(!sql.contains("description"));
        assert!(!sql.contains("geom ="));
        assert!(sql.contains("WHERE id = $2"));
    }

    #[test]
    fn test_update_geometry() {
        let patch = RowPatch {
            geometry: Some(square()),
            ..Default::default()
        };
        let builder = build_update(FeatureTable::Polygons, 1, patch);
        assert!(builder
            .sql()
            .contains("SET geom = ST_GeomFromText($1, $2), updated_at"));
    }

    #[test]
    fn test_list_sql() {
        let query = ListQuery {
            name_contains: Some("park".into()),
            offset: 10,
            limit: 5,
        };
        let builder = build_list(FeatureTable::Polygons, &query);
        let sql = builder.sql();
        assert!(sql.contains("WHERE name ILIKE $1"));
        assert!(sql.ends_with("ORDER BY id OFFSET $2 LIMIT $3"));

        let builder = build_list(FeatureTable::Polygons, &ListQuery::default());
        assert!(!builder.sql().contains("WHERE"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Test Point"), "%Test Point%");
        assert_eq!(like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }
}
