//! SOM training: random sampling with decaying Gaussian neighborhood.

use crate::config::SomConfig;
use crate::error::{Result, TerrasomError};
use crate::som::Som;
use log::info;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Trainer owning the sampling RNG and the decay schedule.
///
/// Training draws one vector per iteration uniformly with replacement, finds
/// its BMU, and moves the whole grid towards it under a Gaussian neighborhood
/// whose radius and learning rate both decay as `exp(-t / iterations)`.
pub struct SomTrainer {
    config: SomConfig,
    rng: ChaCha8Rng,
}

impl SomTrainer {
    /// Creates a trainer; seeded from `config.seed` when present.
    pub fn new(config: SomConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self { config, rng }
    }

    /// Exponential decay factor `exp(-t / iterations)`.
    #[inline]
    fn decay(&self, t: usize) -> f64 {
        if self.config.iterations == 0 {
            return 1.0;
        }
        (-(t as f64) / self.config.iterations as f64).exp()
    }

    /// Neighborhood radius at iteration `t`.
    #[inline]
    pub fn sigma_at(&self, t: usize) -> f64 {
        self.config.sigma * self.decay(t)
    }

    /// Learning rate at iteration `t`.
    #[inline]
    pub fn learning_rate_at(&self, t: usize) -> f64 {
        self.config.learning_rate * self.decay(t)
    }

    /// Trains the map on the given vectors.
    pub fn train(&mut self, som: &mut Som, vectors: &[Vec<f64>]) -> Result<()> {
        self.train_with_progress(som, vectors, |_| {})
    }

    /// Trains the map, invoking `on_iteration` after each update.
    ///
    /// With `iterations = 0` the initial weights are left untouched and
    /// winners are determined purely by the (seeded) initialization.
    pub fn train_with_progress<F>(
        &mut self,
        som: &mut Som,
        vectors: &[Vec<f64>],
        mut on_iteration: F,
    ) -> Result<()>
    where
        F: FnMut(usize),
    {
        if vectors.is_empty() {
            return Err(TerrasomError::Config(
                "training set is empty".to_string(),
            ));
        }
        if let Some(vector) = vectors.first() {
            if vector.len() != som.weight_dim {
                return Err(TerrasomError::Som(format!(
                    "training vectors have dimension {} but the map expects {}",
                    vector.len(),
                    som.weight_dim
                )));
            }
        }
        if self.config.iterations > 0 && self.config.sigma <= 0.0 {
            return Err(TerrasomError::Config(format!(
                "neighborhood sigma must be positive, got {}",
                self.config.sigma
            )));
        }

        info!(
            "training {}x{} map on {} vectors for {} iterations",
            som.som_x,
            som.som_y,
            vectors.len(),
            self.config.iterations
        );

        for t in 0..self.config.iterations {
            let vector = &vectors[self.rng.gen_range(0..vectors.len())];
            let bmu = som.winner(vector)?;
            som.update(vector, bmu, self.learning_rate_at(t), self.sigma_at(t));
            on_iteration(t);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(iterations: usize) -> SomConfig {
        SomConfig {
            som_x: 2,
            som_y: 2,
            iterations,
            sigma: 0.3,
            learning_rate: 0.5,
            seed: Some(42),
        }
    }

    #[test]
    fn test_decay_schedule() {
        let trainer = SomTrainer::new(config(100));
        assert_relative_eq!(trainer.sigma_at(0), 0.3);
        assert_relative_eq!(trainer.learning_rate_at(0), 0.5);
        assert_relative_eq!(trainer.sigma_at(100), 0.3 * (-1.0f64).exp());
        assert!(trainer.sigma_at(50) < trainer.sigma_at(0));
    }

    #[test]
    fn test_empty_training_set_is_error() {
        let mut som = Som::new(&config(10), 2);
        let mut trainer = SomTrainer::new(config(10));
        assert!(trainer.train(&mut som, &[]).is_err());
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        let mut som = Som::new(&config(10), 3);
        let mut trainer = SomTrainer::new(config(10));
        assert!(trainer.train(&mut som, &[vec![0.0, 1.0]]).is_err());
    }

    #[test]
    fn test_zero_iterations_leaves_weights_untouched() {
        let mut som = Som::new(&config(0), 2);
        let before: Vec<Vec<f64>> = som.nodes.iter().map(|n| n.weights.clone()).collect();

        let mut trainer = SomTrainer::new(config(0));
        trainer.train(&mut som, &[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();

        let after: Vec<Vec<f64>> = som.nodes.iter().map(|n| n.weights.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_seeded_training_is_deterministic() {
        let vectors = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];

        let run = || {
            let mut som = Som::new(&config(200), 2);
            let mut trainer = SomTrainer::new(config(200));
            trainer.train(&mut som, &vectors).unwrap();
            som.nodes
                .iter()
                .map(|n| n.weights.clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_training_moves_weights_towards_data() {
        let vectors = vec![vec![1.0, 1.0]];
        let mut som = Som::new(&config(500), 2);
        let mut trainer = SomTrainer::new(config(500));
        trainer.train(&mut som, &vectors).unwrap();

        // The winner of the sole training vector should sit close to it.
        let (x, y) = som.winner(&vectors[0]).unwrap();
        let node = som.get_at(x, y).unwrap();
        assert!(node.distance(&vectors[0]) < 0.2);
    }
}
