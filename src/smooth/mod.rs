//! Heatmap generation: separable Gaussian smoothing of a raster grid.

mod blur;

pub use blur::{gaussian_blur, gaussian_kernel, SurfaceSmoother};
