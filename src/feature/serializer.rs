//! # Feature Serializer
//!
//! Renders stored records as GeoJSON `Feature` / `FeatureCollection`
//! objects. Geometry is decoded as stored, never reprojected.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{decode, GeoJsonGeometry, GeometryError};
use crate::store::{Attributes, FeatureId};

use super::errors::FeatureResult;
use super::kind::GeometryKind;
use super::model::FeatureRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureTag {
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureCollectionTag {
    FeatureCollection,
}

/// A GeoJSON feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub tag: FeatureTag,
    pub id: FeatureId,
    pub geometry: GeoJsonGeometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub name: String,
    pub description: Option<String>,
    pub attributes: Option<Attributes>,
    /// ISO-8601, UTC
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Geodesic distance in meters, set by radius searches only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// An ordered list of features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub tag: FeatureCollectionTag,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            tag: FeatureCollectionTag::FeatureCollection,
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Render one record
///
/// Fails if the stored geometry cannot be decoded or is not the
/// geometry type of `K`.
pub fn to_feature<K: GeometryKind>(record: &FeatureRecord<K>) -> FeatureResult<Feature> {
    let geometry = decode(&record.geometry)?;
    let found = geometry.geometry_type();
    if found != K::GEOMETRY_TYPE {
        return Err(GeometryError::UnexpectedGeometry {
            expected: K::GEOMETRY_TYPE.as_str(),
            found: found.to_string(),
        }
        .into());
    }

    Ok(Feature {
        tag: FeatureTag::Feature,
        id: record.id,
        geometry,
        properties: FeatureProperties {
            name: record.name.clone(),
            description: record.description.clone(),
            attributes: record.attributes.clone(),
            created_at: Some(timestamp(&record.created_at)),
            updated_at: Some(timestamp(&record.updated_at)),
            distance: None,
        },
    })
}

/// Render a radius-search hit with its distance in meters
pub fn to_feature_with_distance<K: GeometryKind>(
    record: &FeatureRecord<K>,
    distance: f64,
) -> FeatureResult<Feature> {
    let mut feature = to_feature(record)?;
    feature.properties.distance = Some(distance);
    Ok(feature)
}

/// Render records in order; empty input gives an empty collection
pub fn to_feature_collection<K: GeometryKind>(
    records: &[FeatureRecord<K>],
) -> FeatureResult<FeatureCollection> {
    let features = records
        .iter()
        .map(to_feature)
        .collect::<FeatureResult<Vec<_>>>()?;
    Ok(FeatureCollection::new(features))
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
