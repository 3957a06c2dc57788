//! Input objects and stored records

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::StoredGeometry;
use crate::store::{Attributes, FeatureId, NewRow, RowPatch, StoredRow};

use super::errors::{FeatureError, FeatureResult};
use super::kind::{GeometryKind, PointKind, PolygonKind};

/// Maximum name length, matching the `VARCHAR(255)` column
pub const MAX_NAME_CHARS: usize = 255;

/// Validated input for creating a feature
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct FeatureCreate<K: GeometryKind> {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Option<Attributes>,
    pub coordinates: K::Coordinates,
}

pub type PointCreate = FeatureCreate<PointKind>;
pub type PolygonCreate = FeatureCreate<PolygonKind>;

impl<K: GeometryKind> FeatureCreate<K> {
    pub fn new(name: impl Into<String>, coordinates: K::Coordinates) -> Self {
        Self {
            name: name.into(),
            description: None,
            attributes: None,
            coordinates,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Validate fields and encode geometry into an insertable row
    pub fn into_row(self) -> FeatureResult<NewRow> {
        validate_name(&self.name)?;
        let geometry = K::encode(&self.coordinates)?;
        Ok(NewRow {
            name: self.name,
            description: self.description,
            attributes: self.attributes,
            geometry,
        })
    }
}

/// Partial update: supplied fields overwrite, absent or `null` fields are left alone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct FeatureUpdate<K: GeometryKind> {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Option<Attributes>,
    #[serde(default)]
    pub coordinates: Option<K::Coordinates>,
}

impl<K: GeometryKind> Default for FeatureUpdate<K> {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            attributes: None,
            coordinates: None,
        }
    }
}

impl<K: GeometryKind> FeatureUpdate<K> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn coordinates(mut self, coordinates: K::Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Validate supplied fields; new coordinates replace the geometry wholesale
    pub fn into_patch(self) -> FeatureResult<RowPatch> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        let geometry = self.coordinates.as_ref().map(K::encode).transpose()?;

        Ok(RowPatch {
            name: self.name,
            description: self.description,
            attributes: self.attributes,
            geometry,
        })
    }
}

fn validate_name(name: &str) -> FeatureResult<()> {
    if name.trim().is_empty() {
        return Err(FeatureError::invalid_field("name", "must not be empty"));
    }
    let chars = name.chars().count();
    if chars > MAX_NAME_CHARS {
        return Err(FeatureError::invalid_field(
            "name",
            format!("{} characters exceeds maximum {}", chars, MAX_NAME_CHARS),
        ));
    }
    Ok(())
}

/// A stored feature of kind `K`
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord<K: GeometryKind> {
    pub id: FeatureId,
    pub name: String,
    pub description: Option<String>,
    pub attributes: Option<Attributes>,
    pub geometry: StoredGeometry,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    kind: PhantomData<K>,
}

impl<K: GeometryKind> From<StoredRow> for FeatureRecord<K> {
    fn from(row: StoredRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            attributes: row.attributes,
            geometry: row.geometry,
            created_at: row.created_at,
            updated_at: row.updated_at,
            kind: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryError;
    use serde_json::json;

    #[test]
    fn test_create_deserializes() {
        let create: PointCreate = serde_json::from_value(json!({
            "name": "Test Point",
            "coordinates": [10.0, 20.0],
            "attributes": {"test": "value"}
        }))
        .unwrap();
        assert_eq!(create.coordinates, vec![10.0, 20.0]);
        assert!(create.description.is_none());

        let row = create.into_row().unwrap();
        assert_eq!(row.geometry.wkt(), "POINT(10 20)");
        assert_eq!(row.attributes.unwrap()["test"], "value");
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let create = PointCreate::new("   ", vec![0.0, 0.0]);
        assert!(matches!(
            create.into_row(),
            Err(FeatureError::InvalidField { field: "name", .. })
        ));
    }

    #[test]
    fn test_create_rejects_long_name() {
        let create = PointCreate::new("x".repeat(MAX_NAME_CHARS + 1), vec![0.0, 0.0]);
        assert!(create.into_row().is_err());
        let create = PointCreate::new("x".repeat(MAX_NAME_CHARS), vec![0.0, 0.0]);
        assert!(create.into_row().is_ok());
    }

    #[test]
    fn test_polygon_create_closes_ring() {
        let create = PolygonCreate::new(
            "square",
            vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0], vec![1.0, 0.0]],
        );
        let row = create.into_row().unwrap();
        assert_eq!(row.geometry.wkt(), "POLYGON((0 0, 0 1, 1 1, 1 0, 0 0))");
    }

    #[test]
    fn test_update_null_fields_are_absent() {
        let update: FeatureUpdate<PointKind> = serde_json::from_value(json!({
            "name": "renamed",
            "description": null,
            "coordinates": null
        }))
        .unwrap();
        let patch = update.into_patch().unwrap();
        assert_eq!(patch.name.as_deref(), Some("renamed"));
        assert!(patch.description.is_none());
        assert!(patch.geometry.is_none());
    }

    #[test]
    fn test_empty_update_is_empty_patch() {
        let patch = FeatureUpdate::<PolygonKind>::default().into_patch().unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_update_validates_coordinates() {
        let update = FeatureUpdate::<PointKind>::default().coordinates(vec![200.0, 0.0]);
        assert!(matches!(
            update.into_patch(),
            Err(FeatureError::Geometry(GeometryError::LongitudeOutOfRange(_)))
        ));
    }
}
