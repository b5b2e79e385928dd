//! Self-Organizing Map grid.

use crate::config::SomConfig;
use crate::error::{Result, TerrasomError};
use crate::som::SomNode;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A Self-Organizing Map: a `som_x × som_y` grid of nodes.
///
/// Nodes are stored in row-major `(x, y)` order, so a node's storage index
/// equals its cluster ID (`x * som_y + y`). The grid is planar; neighborhood
/// distances do not wrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Som {
    /// Grid width (columns of nodes).
    pub som_x: usize,
    /// Grid height (rows of nodes).
    pub som_y: usize,
    /// Weight vector dimensionality.
    pub weight_dim: usize,
    /// The nodes, in row-major `(x, y)` order.
    pub nodes: Vec<SomNode>,
}

impl Som {
    /// Creates a map with randomly initialized weights.
    ///
    /// With `config.seed` set the initialization is fully deterministic;
    /// without it weights come from OS entropy and runs are not reproducible.
    pub fn new(config: &SomConfig, weight_dim: usize) -> Self {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let nodes = (0..config.som_x)
            .flat_map(|x| (0..config.som_y).map(move |y| (x, y)))
            .map(|(x, y)| SomNode::new_random(x, y, weight_dim, &mut rng))
            .collect();

        Self {
            som_x: config.som_x,
            som_y: config.som_y,
            weight_dim,
            nodes,
        }
    }

    /// Creates a map with zero-initialized weights.
    pub fn new_zeros(som_x: usize, som_y: usize, weight_dim: usize) -> Self {
        let nodes = (0..som_x)
            .flat_map(|x| (0..som_y).map(move |y| (x, y)))
            .map(|(x, y)| SomNode::new_zeros(x, y, weight_dim))
            .collect();

        Self {
            som_x,
            som_y,
            weight_dim,
            nodes,
        }
    }

    /// Total number of nodes.
    #[inline]
    pub fn total_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Gets a node by grid position.
    #[inline]
    pub fn get_at(&self, x: usize, y: usize) -> Option<&SomNode> {
        if x < self.som_x && y < self.som_y {
            Some(&self.nodes[x * self.som_y + y])
        } else {
            None
        }
    }

    /// Converts a storage index to a grid position.
    #[inline]
    pub fn index_to_coords(&self, index: usize) -> (usize, usize) {
        (index / self.som_y, index % self.som_y)
    }

    fn check_dim(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.weight_dim {
            return Err(TerrasomError::Som(format!(
                "input dimension {} does not match weight dimension {}",
                input.len(),
                self.weight_dim
            )));
        }
        Ok(())
    }

    /// Finds the best matching unit for an input vector.
    ///
    /// Returns the `(x, y)` of the node with minimum Euclidean distance to
    /// the input; ties go to the lowest `(x, y)` in row-major order.
    pub fn winner(&self, input: &[f64]) -> Result<(usize, usize)> {
        self.check_dim(input)?;

        let mut best: Option<(f64, usize)> = None;
        for (index, node) in self.nodes.iter().enumerate() {
            let dist = node.distance_squared(input);
            match best {
                Some((best_dist, _)) if dist >= best_dist => {}
                _ => best = Some((dist, index)),
            }
        }

        let (_, index) =
            best.ok_or_else(|| TerrasomError::Som("map has no nodes".to_string()))?;
        Ok(self.index_to_coords(index))
    }

    /// Finds the best matching unit using all cores.
    ///
    /// Equivalent to [`Som::winner`], including the tie-break: candidates
    /// compare by `(distance, index)` so the reduction order cannot change
    /// the result.
    pub fn winner_parallel(&self, input: &[f64]) -> Result<(usize, usize)> {
        self.check_dim(input)?;

        let best = self
            .nodes
            .par_iter()
            .enumerate()
            .map(|(index, node)| (node.distance_squared(input), index))
            .min_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(Ordering::Equal)
                    .then(a.1.cmp(&b.1))
            });

        let (_, index) =
            best.ok_or_else(|| TerrasomError::Som("map has no nodes".to_string()))?;
        Ok(self.index_to_coords(index))
    }

    /// Applies one training update towards an input vector.
    ///
    /// Every node moves by `α · exp(-d²/(2σ²)) · (v - w)` where `d` is its
    /// grid distance to the BMU. The Gaussian neighborhood is evaluated for
    /// the whole grid; there is no cutoff disk.
    pub fn update(&mut self, input: &[f64], bmu: (usize, usize), learning_rate: f64, sigma: f64) {
        let two_sigma_sq = 2.0 * sigma * sigma;

        for node in &mut self.nodes {
            let d_sq = node.grid_distance_squared(bmu.0, bmu.1);
            let neighborhood = (-d_sq / two_sigma_sq).exp();
            node.update_weights(input, learning_rate * neighborhood);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SomConfig {
        SomConfig {
            som_x: 3,
            som_y: 4,
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_node_positions_row_major() {
        let som = Som::new(&test_config(), 2);
        assert_eq!(som.total_nodes(), 12);
        for (index, node) in som.nodes.iter().enumerate() {
            assert_eq!(node.x, index / 4);
            assert_eq!(node.y, index % 4);
            assert_eq!(som.index_to_coords(index), (node.x, node.y));
        }
    }

    #[test]
    fn test_seeded_creation_is_reproducible() {
        let a = Som::new(&test_config(), 5);
        let b = Som::new(&test_config(), 5);
        for (na, nb) in a.nodes.iter().zip(&b.nodes) {
            assert_eq!(na.weights, nb.weights);
        }
    }

    #[test]
    fn test_winner_finds_closest_node() {
        let mut som = Som::new_zeros(3, 4, 3);
        som.nodes[7].weights = vec![1.0, 0.0, 0.0];

        let winner = som.winner(&[1.0, 0.0, 0.0]).unwrap();
        assert_eq!(winner, (1, 3)); // index 7 = x 1, y 3
    }

    #[test]
    fn test_winner_tie_breaks_to_lowest_position() {
        // All-zero weights: every node is equidistant from any input.
        let som = Som::new_zeros(3, 4, 2);
        assert_eq!(som.winner(&[0.5, 0.5]).unwrap(), (0, 0));
        assert_eq!(som.winner_parallel(&[0.5, 0.5]).unwrap(), (0, 0));
    }

    #[test]
    fn test_winner_parallel_matches_serial() {
        let som = Som::new(&test_config(), 4);
        let inputs = [
            vec![0.1, 0.2, 0.3, 0.4],
            vec![-0.5, 0.0, 0.5, 1.0],
            vec![0.0, 0.0, 0.0, 0.0],
        ];
        for input in &inputs {
            assert_eq!(
                som.winner(input).unwrap(),
                som.winner_parallel(input).unwrap()
            );
        }
    }

    #[test]
    fn test_winner_rejects_dimension_mismatch() {
        let som = Som::new_zeros(2, 2, 3);
        assert!(som.winner(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_update_pulls_bmu_hardest() {
        let mut som = Som::new_zeros(3, 3, 2);
        let input = vec![1.0, 1.0];
        som.update(&input, (0, 0), 0.5, 1.0);

        let bmu_w = som.get_at(0, 0).unwrap().weights[0];
        let far_w = som.get_at(2, 2).unwrap().weights[0];
        assert!((bmu_w - 0.5).abs() < 1e-12);
        assert!(far_w > 0.0, "continuous neighborhood reaches every node");
        assert!(far_w < bmu_w);
    }
}
