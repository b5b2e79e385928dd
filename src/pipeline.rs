//! End-to-end pipeline: load → normalize → train → label → rasterize → smooth.

use crate::cluster::label_features;
use crate::config::Config;
use crate::error::{Result, TerrasomError};
use crate::feature::{ops, Epsg};
use crate::io::{FeatureStore, RasterStore};
use crate::normalize::VectorNormalizer;
use crate::raster::GridRasterizer;
use crate::smooth::SurfaceSmoother;
use crate::som::{Som, SomTrainer};
use log::info;
use std::path::{Path, PathBuf};

/// Paths of the three artifacts one run produces.
#[derive(Debug, Clone)]
pub struct Artifacts {
    /// Labeled features (GeoJSON).
    pub clusters: PathBuf,
    /// Cluster-ID raster.
    pub raster: PathBuf,
    /// Smoothed density surface.
    pub heatmap: PathBuf,
}

/// The batch pipeline, polymorphic over its I/O collaborators.
///
/// Each stage runs to completion before the next starts; a failing stage
/// aborts the run without writing its artifact, and artifacts already
/// written by earlier stages are left in place.
pub struct Pipeline<F, R> {
    config: Config,
    features: F,
    rasters: R,
}

impl<F: FeatureStore, R: RasterStore> Pipeline<F, R> {
    /// Creates a pipeline over the given configuration and backends.
    pub fn new(config: Config, features: F, rasters: R) -> Self {
        Self {
            config,
            features,
            rasters,
        }
    }

    /// Runs the full pipeline, returning the artifact paths.
    pub fn run(&self, input: &Path, output_base: &str) -> Result<Artifacts> {
        if self.config.som.total_nodes() == 0 {
            return Err(TerrasomError::Config(format!(
                "SOM grid is {}x{}; both dimensions must be positive",
                self.config.som.som_x, self.config.som.som_y
            )));
        }

        let mut collection = self.features.load(input)?;
        if collection.is_empty() {
            return Err(TerrasomError::Config(format!(
                "no features in {}",
                input.display()
            )));
        }
        info!("loaded {} features from {}", collection.len(), input.display());

        ops::reproject(&mut collection, Epsg(self.config.crs))?;
        if let Some(tolerance) = self.config.simplify_tolerance {
            for feature in &mut collection.features {
                feature.geometry = ops::simplify(&feature.geometry, tolerance);
            }
        }

        let normalizer = VectorNormalizer::new(self.config.normalize.clone());
        let normalized = normalizer.build(&collection.features, &self.config.attributes)?;

        let mut som = Som::new(&self.config.som, normalized.dim());
        let mut trainer = SomTrainer::new(self.config.som.clone());
        trainer.train(&mut som, &normalized.vectors)?;

        let crs = collection.crs.unwrap_or(Epsg(self.config.crs));
        let labeled = label_features(collection.features, normalized, &som, crs)?;

        let clusters = artifact_path(output_base, "clusters.geojson");
        self.features.save(&labeled, &clusters)?;
        info!("wrote {}", clusters.display());

        let grid = GridRasterizer::new(self.config.raster.clone()).rasterize(&labeled)?;
        let raster = artifact_path(output_base, "raster.tsr");
        self.rasters.save(&grid, &raster)?;
        info!("wrote {}", raster.display());

        let smoother = SurfaceSmoother::new(self.config.smooth.clone(), self.config.raster.fill);
        let smoothed = smoother.smooth(&grid);
        let heatmap = artifact_path(output_base, "heatmap.tsr");
        self.rasters.save(&smoothed, &heatmap)?;
        info!("wrote {}", heatmap.display());

        Ok(Artifacts {
            clusters,
            raster,
            heatmap,
        })
    }

}

fn artifact_path(output_base: &str, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}", output_base, suffix))
}
