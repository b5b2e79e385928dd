//! Configuration for the terrasom pipeline.

use crate::raster::FillPolicy;
use serde::{Deserialize, Serialize};

/// Main configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Names of the attribute columns used for clustering.
    pub attributes: Vec<String>,

    /// EPSG code the features are expected to be in.
    pub crs: u32,

    /// Douglas-Peucker simplification tolerance applied at load time.
    /// `None` disables simplification.
    pub simplify_tolerance: Option<f64>,

    /// Normalization configuration.
    pub normalize: NormalizeConfig,

    /// SOM (Self-Organizing Map) configuration.
    pub som: SomConfig,

    /// Rasterization configuration.
    pub raster: RasterConfig,

    /// Heatmap smoothing configuration.
    pub smooth: SmoothConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            crs: 3763,
            simplify_tolerance: Some(0.001),
            normalize: NormalizeConfig::default(),
            som: SomConfig::default(),
            raster: RasterConfig::default(),
            smooth: SmoothConfig::default(),
        }
    }
}

/// Vector normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Append geometry-centroid longitude/latitude to the attribute vector.
    /// Default: true.
    pub include_geography: bool,

    /// Weight applied to the two geographic dimensions after scaling.
    /// Default: 1.0.
    pub geo_weight: f64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            include_geography: true,
            geo_weight: 1.0,
        }
    }
}

/// Self-Organizing Map configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SomConfig {
    /// Grid width (number of columns of nodes).
    /// Default: 5.
    pub som_x: usize,

    /// Grid height (number of rows of nodes).
    /// Default: 5.
    pub som_y: usize,

    /// Number of training iterations.
    /// Default: 1000.
    pub iterations: usize,

    /// Initial neighborhood radius, in grid units.
    /// Default: 0.3.
    pub sigma: f64,

    /// Initial learning rate.
    /// Default: 0.5.
    pub learning_rate: f64,

    /// Random seed for reproducibility.
    /// Default: None (non-deterministic initialization and sampling).
    pub seed: Option<u64>,
}

impl Default for SomConfig {
    fn default() -> Self {
        Self {
            som_x: 5,
            som_y: 5,
            iterations: 1000,
            sigma: 0.3,
            learning_rate: 0.5,
            seed: None,
        }
    }
}

impl SomConfig {
    /// Returns the total number of nodes in the map.
    #[inline]
    pub fn total_nodes(&self) -> usize {
        self.som_x * self.som_y
    }
}

/// Rasterization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterConfig {
    /// Requested cell size in map units. The rasterizer may coarsen it to
    /// honor `max_cells`.
    /// Default: 0.5.
    pub cell_size: f64,

    /// Hard ceiling on `width * height` of the output grid.
    /// Default: 10,000,000.
    pub max_cells: u64,

    /// Fill convention for cells no geometry touches.
    /// Default: sentinel (-1).
    pub fill: FillPolicy,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            cell_size: 0.5,
            max_cells: 10_000_000,
            fill: FillPolicy::Sentinel,
        }
    }
}

/// Heatmap smoothing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothConfig {
    /// Gaussian blur standard deviation, in cells. Zero is an identity pass.
    /// Default: 1.0.
    pub sigma: f64,
}

impl Default for SmoothConfig {
    fn default() -> Self {
        Self { sigma: 1.0 }
    }
}
