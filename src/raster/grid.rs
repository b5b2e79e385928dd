//! Raster grid, affine transform and fill conventions.

use crate::feature::Epsg;
use geo_types::{coord, Rect};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Fill convention for cells no geometry touches.
///
/// The two policies are distinct output contracts: they set different
/// fill/nodata values and select different heatmap post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
    /// Fill and nodata are `0`; the heatmap is emitted as blurred.
    Zero,
    /// Fill and nodata are `-1`; blurred values below zero are clamped back
    /// to the sentinel and the heatmap is rounded to 2 decimals.
    Sentinel,
}

impl FillPolicy {
    /// The fill (and nodata) value of this policy.
    #[inline]
    pub fn fill_value(self) -> f32 {
        match self {
            FillPolicy::Zero => 0.0,
            FillPolicy::Sentinel => -1.0,
        }
    }
}

/// North-up affine transform: square cells anchored at the top-left corner,
/// X increasing, Y decreasing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridTransform {
    /// X coordinate of the grid's left edge.
    pub origin_x: f64,
    /// Y coordinate of the grid's top edge.
    pub origin_y: f64,
    /// Cell edge length in map units.
    pub cell_size: f64,
}

impl GridTransform {
    /// Builds a transform from the top-left corner `(x_min, y_max)`.
    pub fn from_origin(x_min: f64, y_max: f64, cell_size: f64) -> Self {
        Self {
            origin_x: x_min,
            origin_y: y_max,
            cell_size,
        }
    }

    /// The `(row, col)` of the cell containing a map coordinate, unbounded;
    /// callers clamp against the grid shape.
    #[inline]
    pub fn cell_of(&self, x: f64, y: f64) -> (i64, i64) {
        let col = ((x - self.origin_x) / self.cell_size).floor() as i64;
        let row = ((self.origin_y - y) / self.cell_size).floor() as i64;
        (row, col)
    }

    /// The map-space rectangle covered by a cell.
    pub fn cell_bounds(&self, row: usize, col: usize) -> Rect<f64> {
        let x_min = self.origin_x + col as f64 * self.cell_size;
        let y_max = self.origin_y - row as f64 * self.cell_size;
        Rect::new(
            coord! { x: x_min, y: y_max - self.cell_size },
            coord! { x: x_min + self.cell_size, y: y_max },
        )
    }
}

/// A dense single-band `f32` raster with its transform, nodata sentinel and
/// CRS tag. Data is stored `height × width`, row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    /// Cell values, shape `(height, width)`.
    pub data: Array2<f32>,
    /// Affine transform.
    pub transform: GridTransform,
    /// Value marking cells no feature covers.
    pub nodata: f32,
    /// CRS of the grid.
    pub crs: Epsg,
}

impl RasterGrid {
    /// Creates a grid with every cell set to `fill`.
    pub fn filled(
        width: usize,
        height: usize,
        transform: GridTransform,
        fill: f32,
        crs: Epsg,
    ) -> Self {
        Self {
            data: Array2::from_elem((height, width), fill),
            transform,
            nodata: fill,
            crs,
        }
    }

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_values() {
        assert_eq!(FillPolicy::Zero.fill_value(), 0.0);
        assert_eq!(FillPolicy::Sentinel.fill_value(), -1.0);
    }

    #[test]
    fn test_cell_of_north_up() {
        let transform = GridTransform::from_origin(0.0, 10.0, 2.0);
        assert_eq!(transform.cell_of(0.0, 10.0), (0, 0));
        assert_eq!(transform.cell_of(3.0, 9.0), (0, 1));
        assert_eq!(transform.cell_of(0.5, 0.5), (4, 0));
        // Left/below the grid goes negative rather than clamping.
        assert_eq!(transform.cell_of(-0.1, 10.0).1, -1);
    }

    #[test]
    fn test_cell_bounds_roundtrip() {
        let transform = GridTransform::from_origin(100.0, 200.0, 5.0);
        let rect = transform.cell_bounds(2, 3);
        assert_eq!(rect.min().x, 115.0);
        assert_eq!(rect.max().x, 120.0);
        assert_eq!(rect.max().y, 190.0);
        assert_eq!(rect.min().y, 185.0);

        let center = rect.center();
        assert_eq!(transform.cell_of(center.x, center.y), (2, 3));
    }

    #[test]
    fn test_filled_grid_shape() {
        let transform = GridTransform::from_origin(0.0, 1.0, 1.0);
        let grid = RasterGrid::filled(4, 3, transform, -1.0, Epsg(3763));
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.nodata, -1.0);
        assert!(grid.data.iter().all(|&v| v == -1.0));
    }
}
