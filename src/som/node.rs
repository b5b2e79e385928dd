//! Node representation for the Self-Organizing Map.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// A node in the Self-Organizing Map.
///
/// Each node sits at an integer grid position `(x, y)` and owns a weight
/// vector living in the same space as the normalized feature vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SomNode {
    /// Column position on the grid (`0 ≤ x < som_x`).
    pub x: usize,
    /// Row position on the grid (`0 ≤ y < som_y`).
    pub y: usize,
    /// The node's weight vector.
    pub weights: Vec<f64>,
}

impl SomNode {
    /// Creates a node with small random weights.
    ///
    /// Weights are drawn from a normal distribution with mean 0 and std 0.1.
    pub fn new_random<R: Rng>(x: usize, y: usize, weight_dim: usize, rng: &mut R) -> Self {
        let normal = Normal::new(0.0, 0.1).unwrap();
        let weights = (0..weight_dim).map(|_| normal.sample(rng)).collect();

        Self { x, y, weights }
    }

    /// Creates a node with zero weights.
    pub fn new_zeros(x: usize, y: usize, weight_dim: usize) -> Self {
        Self {
            x,
            y,
            weights: vec![0.0; weight_dim],
        }
    }

    /// Creates a node with the given weights.
    pub fn new_with_weights(x: usize, y: usize, weights: Vec<f64>) -> Self {
        Self { x, y, weights }
    }

    /// Squared Euclidean distance between this node's weights and an input
    /// vector.
    #[inline]
    pub fn distance_squared(&self, input: &[f64]) -> f64 {
        debug_assert_eq!(
            self.weights.len(),
            input.len(),
            "weight and input dimensions must match"
        );

        self.weights
            .iter()
            .zip(input.iter())
            .map(|(w, i)| (w - i).powi(2))
            .sum()
    }

    /// Euclidean distance between this node's weights and an input vector.
    pub fn distance(&self, input: &[f64]) -> f64 {
        self.distance_squared(input).sqrt()
    }

    /// Squared distance on the grid to another position.
    #[inline]
    pub fn grid_distance_squared(&self, x: usize, y: usize) -> f64 {
        let dx = self.x as f64 - x as f64;
        let dy = self.y as f64 - y as f64;
        dx * dx + dy * dy
    }

    /// Moves the weights towards an input vector by the given influence,
    /// the product of learning rate and neighborhood factor.
    pub fn update_weights(&mut self, input: &[f64], influence: f64) {
        for (w, i) in self.weights.iter_mut().zip(input.iter()) {
            *w += influence * (i - *w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_zero_node() {
        let node = SomNode::new_zeros(2, 3, 4);
        assert_eq!(node.x, 2);
        assert_eq!(node.y, 3);
        assert!(node.weights.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_random_initialization_is_seeded() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(7);
        let mut rng_b = ChaCha8Rng::seed_from_u64(7);
        let a = SomNode::new_random(0, 0, 16, &mut rng_a);
        let b = SomNode::new_random(0, 0, 16, &mut rng_b);
        assert_eq!(a.weights, b.weights);
        assert!(a.weights.iter().any(|&w| w != 0.0));
    }

    #[test]
    fn test_distance() {
        let node = SomNode::new_with_weights(0, 0, vec![1.0, 0.0]);
        let dist = node.distance(&[0.0, 1.0]);
        assert!((dist - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_grid_distance() {
        let node = SomNode::new_zeros(0, 0, 1);
        assert_eq!(node.grid_distance_squared(3, 4), 25.0);
    }

    #[test]
    fn test_update_weights_moves_towards_input() {
        let mut node = SomNode::new_with_weights(0, 0, vec![0.0, 0.0]);
        node.update_weights(&[1.0, 1.0], 0.5);
        assert_eq!(node.weights, vec![0.5, 0.5]);
    }
}
