//! Separable Gaussian blur with reflect boundary handling.

use crate::config::SmoothConfig;
use crate::raster::{FillPolicy, RasterGrid};
use ndarray::Array2;

/// Builds a normalized 1-D Gaussian kernel.
///
/// The kernel is truncated at 4 standard deviations, so `sigma = 0` yields
/// the single-tap identity kernel.
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (4.0 * sigma + 0.5) as isize;
    if sigma <= 0.0 || radius == 0 {
        return vec![1.0];
    }

    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|i| (-((i * i) as f64) / two_sigma_sq).exp())
        .collect();

    let sum: f64 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Reflect-mode index: `(d c b a | a b c d | d c b a)`.
#[inline]
fn reflect_index(i: isize, n: isize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * n;
    let mut i = i.rem_euclid(period);
    if i >= n {
        i = period - 1 - i;
    }
    i as usize
}

/// Applies a separable 2-D Gaussian blur to a raster plane.
pub fn gaussian_blur(data: &Array2<f32>, sigma: f64) -> Array2<f32> {
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    if radius == 0 {
        return data.clone();
    }

    let (height, width) = data.dim();
    let (h, w) = (height as isize, width as isize);

    // Horizontal pass.
    let mut pass = Array2::<f32>::zeros((height, width));
    for row in 0..height {
        for col in 0..w {
            let mut acc = 0.0f64;
            for (k, weight) in kernel.iter().enumerate() {
                let src = reflect_index(col + k as isize - radius, w);
                acc += weight * f64::from(data[[row, src]]);
            }
            pass[[row, col as usize]] = acc as f32;
        }
    }

    // Vertical pass.
    let mut out = Array2::<f32>::zeros((height, width));
    for row in 0..h {
        for col in 0..width {
            let mut acc = 0.0f64;
            for (k, weight) in kernel.iter().enumerate() {
                let src = reflect_index(row + k as isize - radius, h);
                acc += weight * f64::from(pass[[src, col]]);
            }
            out[[row as usize, col]] = acc as f32;
        }
    }

    out
}

/// Turns a cluster raster into a smoothed density surface.
///
/// Post-processing follows the fill policy the raster was built with: the
/// sentinel variant clamps blurred values below zero back to `-1` (the blur
/// kernel averages nodata neighbors into valid cells) and rounds to 2
/// decimal places; the zero variant emits the blurred values untouched.
pub struct SurfaceSmoother {
    config: SmoothConfig,
    policy: FillPolicy,
}

impl SurfaceSmoother {
    /// Creates a smoother for the given configuration and fill policy.
    pub fn new(config: SmoothConfig, policy: FillPolicy) -> Self {
        Self { config, policy }
    }

    /// Produces the smoothed surface; shape, transform, nodata and CRS are
    /// carried over from the input grid.
    pub fn smooth(&self, grid: &RasterGrid) -> RasterGrid {
        let mut data = gaussian_blur(&grid.data, self.config.sigma);

        if self.policy == FillPolicy::Sentinel {
            data.mapv_inplace(|v| {
                let v = if v < 0.0 { -1.0 } else { v };
                ((f64::from(v) * 100.0).round() / 100.0) as f32
            });
        }

        RasterGrid {
            data,
            transform: grid.transform,
            nodata: grid.nodata,
            crs: grid.crs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::Epsg;
    use crate::raster::GridTransform;
    use approx::assert_relative_eq;

    fn grid_from(data: Array2<f32>, nodata: f32) -> RasterGrid {
        RasterGrid {
            data,
            transform: GridTransform::from_origin(0.0, 1.0, 1.0),
            nodata,
            crs: Epsg(3763),
        }
    }

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(1.0);
        assert_eq!(kernel.len(), 9);
        assert_relative_eq!(kernel.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        for i in 0..kernel.len() / 2 {
            assert_eq!(kernel[i], kernel[kernel.len() - 1 - i]);
        }
    }

    #[test]
    fn test_zero_sigma_kernel_is_identity() {
        assert_eq!(gaussian_kernel(0.0), vec![1.0]);
    }

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(0, 4), 0);
        assert_eq!(reflect_index(3, 4), 3);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
    }

    #[test]
    fn test_blur_of_constant_field_is_constant() {
        let data = Array2::from_elem((5, 7), 3.0f32);
        let blurred = gaussian_blur(&data, 1.5);
        for &v in blurred.iter() {
            assert_relative_eq!(v, 3.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_blur_spreads_an_impulse_symmetrically() {
        let mut data = Array2::zeros((5, 5));
        data[[2, 2]] = 1.0f32;
        let blurred = gaussian_blur(&data, 0.5);

        assert!(blurred[[2, 2]] < 1.0);
        assert!(blurred[[2, 1]] > 0.0);
        assert_relative_eq!(blurred[[2, 1]], blurred[[2, 3]]);
        assert_relative_eq!(blurred[[1, 2]], blurred[[3, 2]]);
    }

    #[test]
    fn test_zero_sigma_smoothing_is_identity() {
        let mut data = Array2::zeros((3, 3));
        data[[1, 1]] = 5.0f32;
        let grid = grid_from(data.clone(), 0.0);

        let smoother = SurfaceSmoother::new(SmoothConfig { sigma: 0.0 }, FillPolicy::Zero);
        let smoothed = smoother.smooth(&grid);
        assert_eq!(smoothed.data, data);
        assert_eq!(smoothed.transform, grid.transform);
    }

    #[test]
    fn test_sentinel_smoothing_clamps_and_rounds() {
        let mut data = Array2::from_elem((4, 4), -1.0f32);
        data[[1, 1]] = 10.0;
        let grid = grid_from(data, -1.0);

        let smoother = SurfaceSmoother::new(SmoothConfig { sigma: 1.0 }, FillPolicy::Sentinel);
        let smoothed = smoother.smooth(&grid);

        for &v in smoothed.data.iter() {
            assert!(v >= 0.0 || v == -1.0, "unexpected negative value {}", v);
            let scaled = f64::from(v) * 100.0;
            assert_relative_eq!(scaled, scaled.round(), epsilon = 1e-3);
        }
    }

    #[test]
    fn test_zero_policy_does_not_round() {
        let mut data = Array2::zeros((4, 4));
        data[[1, 1]] = 1.0f32;
        let grid = grid_from(data, 0.0);

        let smoother = SurfaceSmoother::new(SmoothConfig { sigma: 1.0 }, FillPolicy::Zero);
        let smoothed = smoother.smooth(&grid);

        // Blurred impulse values are tiny and not multiples of 0.01.
        assert!(smoothed
            .data
            .iter()
            .any(|&v| v > 0.0 && (f64::from(v) * 100.0).fract().abs() > 1e-6));
    }
}
