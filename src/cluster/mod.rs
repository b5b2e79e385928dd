//! Cluster encoding: winner grid cells to stable integer labels.

use crate::error::{Result, TerrasomError};
use crate::feature::{Epsg, Feature};
use crate::normalize::NormalizedVectors;
use crate::som::Som;
use rayon::prelude::*;

/// A stable integer cluster label, `x * som_y + y` of the winning node.
pub type ClusterId = u32;

/// Encodes a winner position as a cluster ID.
///
/// For fixed `som_y` this is a bijection from `(x, y)` onto
/// `[0, som_x * som_y)`.
#[inline]
pub fn encode(x: usize, y: usize, som_y: usize) -> ClusterId {
    debug_assert!(y < som_y, "y must lie inside the grid");
    (x * som_y + y) as ClusterId
}

/// Decodes a cluster ID back to its winner position.
#[inline]
pub fn decode(cluster: ClusterId, som_y: usize) -> (usize, usize) {
    let cluster = cluster as usize;
    (cluster / som_y, cluster % som_y)
}

/// A feature with its cluster label and the normalized vector it was
/// clustered on.
#[derive(Debug, Clone)]
pub struct LabeledFeature {
    /// The original feature.
    pub feature: Feature,
    /// The cluster label.
    pub cluster: ClusterId,
    /// The normalized vector, index-aligned with the output columns.
    pub normalized: Vec<f64>,
}

/// Labeled features plus the context the output layer needs.
#[derive(Debug, Clone)]
pub struct LabeledCollection {
    /// Labeled features, in input order.
    pub features: Vec<LabeledFeature>,
    /// Column name per normalized-vector dimension.
    pub columns: Vec<String>,
    /// CRS of the geometries.
    pub crs: Epsg,
}

impl LabeledCollection {
    /// Number of labeled features.
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

/// Labels every feature with its winner's cluster ID, preserving input order.
///
/// Winner search runs in parallel; the map is only read.
pub fn label_features(
    features: Vec<Feature>,
    normalized: NormalizedVectors,
    som: &Som,
    crs: Epsg,
) -> Result<LabeledCollection> {
    if features.len() != normalized.vectors.len() {
        return Err(TerrasomError::Som(format!(
            "{} features but {} vectors",
            features.len(),
            normalized.vectors.len()
        )));
    }

    let winners: Vec<(usize, usize)> = normalized
        .vectors
        .par_iter()
        .map(|vector| som.winner(vector))
        .collect::<Result<_>>()?;

    let labeled = features
        .into_iter()
        .zip(normalized.vectors)
        .zip(winners)
        .map(|((feature, vector), (x, y))| LabeledFeature {
            feature,
            cluster: encode(x, y, som.som_y),
            normalized: vector,
        })
        .collect();

    Ok(LabeledCollection {
        features: labeled,
        columns: normalized.columns,
        crs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NormalizeConfig, SomConfig};
    use crate::normalize::VectorNormalizer;
    use geo_types::point;
    use std::collections::BTreeMap;

    #[test]
    fn test_encode_decode_bijection() {
        let (som_x, som_y) = (3, 4);
        let mut seen = std::collections::HashSet::new();
        for x in 0..som_x {
            for y in 0..som_y {
                let id = encode(x, y, som_y);
                assert!((id as usize) < som_x * som_y);
                assert!(seen.insert(id), "cluster IDs must be unique");
                assert_eq!(decode(id, som_y), (x, y));
            }
        }
    }

    #[test]
    fn test_labels_preserve_order_and_range() {
        let features: Vec<Feature> = (0..4)
            .map(|i| {
                let mut attributes = BTreeMap::new();
                attributes.insert("v".to_string(), f64::from(i % 2));
                Feature::new(point!(x: f64::from(i), y: 0.0).into(), attributes)
            })
            .collect();

        let normalizer = VectorNormalizer::new(NormalizeConfig::default());
        let normalized = normalizer.build(&features, &["v".to_string()]).unwrap();

        let config = SomConfig {
            som_x: 2,
            som_y: 2,
            seed: Some(1),
            ..Default::default()
        };
        let som = Som::new(&config, normalized.dim());

        let labeled = label_features(features, normalized, &som, Epsg(3763)).unwrap();
        assert_eq!(labeled.len(), 4);
        for lf in &labeled.features {
            assert!((lf.cluster as usize) < config.total_nodes());
        }
    }
}
