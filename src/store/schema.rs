//! # PostGIS Schema
//!
//! Idempotent DDL for the two feature tables and their GiST indexes.

use crate::geometry::WGS84_SRID;

use super::row::FeatureTable;

/// Name logged when the schema is applied
pub const MIGRATION_NAME: &str = "0001_spatial_features";

const TABLES: [FeatureTable; 2] = [FeatureTable::Points, FeatureTable::Polygons];

/// Statements to run, in order, to bring a database up to date
pub fn migration_statements() -> Vec<String> {
    let mut statements = vec!["CREATE EXTENSION IF NOT EXISTS postgis".to_string()];

    for table in TABLES {
        let name = table.table_name();
        statements.push(format!(
            "CREATE TABLE IF NOT EXISTS {name} (\
             id BIGSERIAL PRIMARY KEY, \
             name VARCHAR(255) NOT NULL, \
             description TEXT, \
             attributes JSONB, \
             geom geometry({kind}, {srid}) NOT NULL, \
             created_at TIMESTAMPTZ NOT NULL DEFAULT now(), \
             updated_at TIMESTAMPTZ NOT NULL DEFAULT now(), \
             CHECK (updated_at >= created_at))",
            kind = table.geometry_column_type(),
            srid = WGS84_SRID,
        ));
        statements.push(format!(
            "CREATE INDEX IF NOT EXISTS idx_{name}_geom ON {name} USING GIST (geom)"
        ));
    }

    statements
}
