//! Feature and feature-collection types.

use crate::error::{Result, TerrasomError};
use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An opaque coordinate reference system code (EPSG).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epsg(pub u32);

impl fmt::Display for Epsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

/// One input record: a geometry plus its numeric attributes.
#[derive(Debug, Clone)]
pub struct Feature {
    /// The feature geometry. Owned by the I/O layer; the core only reads it.
    pub geometry: Geometry<f64>,
    /// Numeric attribute values by column name.
    pub attributes: BTreeMap<String, f64>,
    /// Optional identifier carried through to the labeled output, as
    /// `(column name, value)`.
    pub id: Option<(String, serde_json::Value)>,
}

impl Feature {
    /// Creates a feature with no identifier.
    pub fn new(geometry: Geometry<f64>, attributes: BTreeMap<String, f64>) -> Self {
        Self {
            geometry,
            attributes,
            id: None,
        }
    }

    /// Looks up an attribute value, failing with a configuration error that
    /// names the missing column.
    pub fn attribute(&self, name: &str) -> Result<f64> {
        self.attributes.get(name).copied().ok_or_else(|| {
            TerrasomError::Config(format!("attribute '{}' missing on feature", name))
        })
    }
}

/// An ordered collection of features with an optional CRS tag.
///
/// Feature order is significant: cluster labels, raster overwrites and the
/// saved output all preserve it.
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    /// The features, in input order.
    pub features: Vec<Feature>,
    /// CRS of the geometries, when known.
    pub crs: Option<Epsg>,
}

impl FeatureCollection {
    /// Creates a collection from features and an optional CRS.
    pub fn new(features: Vec<Feature>, crs: Option<Epsg>) -> Self {
        Self { features, crs }
    }

    /// Number of features.
    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True if the collection holds no features.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
