//! Building normalized training vectors from features.

use crate::config::NormalizeConfig;
use crate::error::{Result, TerrasomError};
use crate::feature::{ops, Feature};
use crate::normalize::NormalizationParams;
use log::warn;

/// Column name for the appended centroid X dimension.
pub const CENTROID_LON: &str = "centroid_lon";
/// Column name for the appended centroid Y dimension.
pub const CENTROID_LAT: &str = "centroid_lat";

/// Normalized vectors plus the parameters and column names that produced them.
#[derive(Debug, Clone)]
pub struct NormalizedVectors {
    /// One vector per feature, index-aligned with the input order.
    pub vectors: Vec<Vec<f64>>,
    /// The fitted scaling parameters.
    pub params: NormalizationParams,
    /// Column name per dimension (attributes, then the geographic pair).
    pub columns: Vec<String>,
}

impl NormalizedVectors {
    /// Vector dimensionality.
    #[inline]
    pub fn dim(&self) -> usize {
        self.columns.len()
    }
}

/// Maps raw feature attributes (plus optional centroid coordinates) into the
/// normalized vector space the SOM trains on.
#[derive(Debug, Clone)]
pub struct VectorNormalizer {
    config: NormalizeConfig,
}

impl VectorNormalizer {
    /// Creates a normalizer with the given configuration.
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// Builds one normalized vector per feature.
    ///
    /// All vectors share the scaling fitted over the full dataset; the last
    /// two dimensions (when geography is included) are multiplied by
    /// `geo_weight` after scaling. Zero-range dimensions scale to `0.0` and
    /// are reported with a warning.
    pub fn build(&self, features: &[Feature], attributes: &[String]) -> Result<NormalizedVectors> {
        if attributes.is_empty() {
            return Err(TerrasomError::Config(
                "attribute list is empty; nothing to cluster on".to_string(),
            ));
        }

        let columns = self.column_names(attributes);

        let mut rows = Vec::with_capacity(features.len());
        for feature in features {
            let mut row = Vec::with_capacity(columns.len());
            for name in attributes {
                row.push(feature.attribute(name)?);
            }
            if self.config.include_geography {
                let (lon, lat) = ops::centroid(&feature.geometry)?;
                row.push(lon);
                row.push(lat);
            }
            rows.push(row);
        }

        let params = NormalizationParams::fit(&rows)?;
        for d in params.degenerate_dims() {
            warn!(
                "attribute '{}' has zero range; its normalized values are all 0.0",
                columns[d]
            );
        }

        let geo_dims = if self.config.include_geography { 2 } else { 0 };
        let vectors = rows
            .iter()
            .map(|row| {
                let mut vector = params.transform(row);
                let len = vector.len();
                for value in &mut vector[len - geo_dims..] {
                    *value *= self.config.geo_weight;
                }
                vector
            })
            .collect();

        Ok(NormalizedVectors {
            vectors,
            params,
            columns,
        })
    }

    /// Column names for the produced dimensions.
    pub fn column_names(&self, attributes: &[String]) -> Vec<String> {
        let mut columns = attributes.to_vec();
        if self.config.include_geography {
            columns.push(CENTROID_LON.to_string());
            columns.push(CENTROID_LAT.to_string());
        }
        columns
    }
}
