//! # Store Rows
//!
//! Geometry-kind agnostic records exchanged with the backing store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::geometry::{decode, GeometryLiteral, StoredGeometry};

/// Store-assigned identifier
pub type FeatureId = i64;

/// Opaque key/value attributes, passed through unchanged
pub type Attributes = Map<String, Value>;

/// The two feature tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureTable {
    Points,
    Polygons,
}

impl FeatureTable {
    /// Table name in the database
    pub fn table_name(&self) -> &'static str {
        match self {
            FeatureTable::Points => "spatial_points",
            FeatureTable::Polygons => "spatial_polygons",
        }
    }

    /// Column geometry type
    pub fn geometry_column_type(&self) -> &'static str {
        match self {
            FeatureTable::Points => "POINT",
            FeatureTable::Polygons => "POLYGON",
        }
    }
}

impl fmt::Display for FeatureTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A row to insert; geometry has already passed through the codec
#[derive(Debug, Clone)]
pub struct NewRow {
    pub name: String,
    pub description: Option<String>,
    pub attributes: Option<Attributes>,
    pub geometry: GeometryLiteral,
}

/// Columns to overwrite; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct RowPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<Attributes>,
    pub geometry: Option<GeometryLiteral>,
}

impl RowPatch {
    /// True if no column would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.attributes.is_none()
            && self.geometry.is_none()
    }

    /// Drop fields that already hold the supplied value in `current`
    ///
    /// Geometry is compared on decoded coordinates so that the store's own
    /// text formatting does not count as a change.
    pub fn retain_changes(self, current: &StoredRow) -> RowPatch {
        let geometry = self.geometry.filter(|literal| {
            match (decode(&StoredGeometry::from(literal)), decode(&current.geometry)) {
                (Ok(new), Ok(old)) => new != old,
                _ => true,
            }
        });

        RowPatch {
            name: self.name.filter(|name| *name != current.name),
            description: self
                .description
                .filter(|d| current.description.as_deref() != Some(d.as_str())),
            attributes: self
                .attributes
                .filter(|a| current.attributes.as_ref() != Some(a)),
            geometry,
        }
    }
}

/// A row as stored
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: FeatureId,
    pub name: String,
    pub description: Option<String>,
    pub attributes: Option<Attributes>,
    pub geometry: StoredGeometry,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Paging and filtering for a table listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Case-insensitive substring match on `name`
    pub name_contains: Option<String>,
    pub offset: usize,
    pub limit: usize,
}

/// Spatial predicate evaluated by the store against a table's geometry column
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialPredicate {
    /// Row geometry lies within the given geometry
    Within(GeometryLiteral),
    /// Row geometry intersects the given geometry
    Intersects(GeometryLiteral),
    /// Row geometry contains the given geometry
    Contains(GeometryLiteral),
    /// Geodesic distance from row geometry to `center` is at most `radius_meters`
    DWithin {
        center: GeometryLiteral,
        radius_meters: f64,
    },
}

impl SpatialPredicate {
    /// Name of the native store function
    pub fn function_name(&self) -> &'static str {
        match self {
            SpatialPredicate::Within(_) => "ST_Within",
            SpatialPredicate::Intersects(_) => "ST_Intersects",
            SpatialPredicate::Contains(_) => "ST_Contains",
            SpatialPredicate::DWithin { .. } => "ST_DWithin",
        }
    }

    /// The geometry argument
    pub fn operand(&self) -> &GeometryLiteral {
        match self {
            SpatialPredicate::Within(g)
            | SpatialPredicate::Intersects(g)
            | SpatialPredicate::Contains(g) => g,
            SpatialPredicate::DWithin { center, .. } => center,
        }
    }
}

/// A predicate hit; `distance` is set for distance predicates
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialMatch {
    pub row: StoredRow,
    pub distance: Option<f64>,
}
