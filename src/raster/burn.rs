//! All-touched rasterization of labeled features.

use crate::cluster::LabeledCollection;
use crate::config::RasterConfig;
use crate::error::{Result, TerrasomError};
use crate::feature::ops;
use crate::raster::{GridTransform, RasterGrid};
use geo::{BoundingRect, Intersects};
use geo_types::Geometry;
use log::info;

/// The resolution the refinement loop settled on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Final cell size, possibly coarsened from the request.
    pub cell_size: f64,
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
}

/// Converts labeled geometries into a regular grid of cluster IDs.
///
/// The requested cell size is a preference, not a contract: it is doubled
/// until the grid fits the `max_cells` budget, and the run fails if the
/// budget is unattainable within the bounding box.
pub struct GridRasterizer {
    config: RasterConfig,
}

impl GridRasterizer {
    /// Creates a rasterizer with the given configuration.
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }

    /// Resolves the final cell size and grid shape for a bounding box.
    ///
    /// Doubles `cell_size` while `width * height` exceeds `max_cells`. Every
    /// same-input call resolves to the same resolution.
    pub fn resolve_resolution(
        bounds: (f64, f64, f64, f64),
        cell_size: f64,
        max_cells: u64,
    ) -> Result<Resolution> {
        let (x_min, y_min, x_max, y_max) = bounds;
        let (extent_x, extent_y) = (x_max - x_min, y_max - y_min);

        let dims = |cell: f64| -> (usize, usize) {
            ((extent_x / cell) as usize, (extent_y / cell) as usize)
        };

        let mut cell = cell_size;
        let (mut width, mut height) = dims(cell);
        if width == 0 || height == 0 {
            return Err(TerrasomError::Config(format!(
                "raster dimensions are {}x{} with cell size {}; choose a smaller cell size",
                width, height, cell_size
            )));
        }

        while (width as u128) * (height as u128) > u128::from(max_cells) {
            cell *= 2.0;
            (width, height) = dims(cell);
            info!(
                "adjusted cell size to {} with dimensions {} x {}",
                cell, width, height
            );
            if cell > extent_x.max(extent_y) {
                return Err(TerrasomError::Config(format!(
                    "cell budget of {} cells is unattainable: cell size {} exceeds the bounding box extent",
                    max_cells, cell
                )));
            }
        }

        if width == 0 || height == 0 {
            return Err(TerrasomError::Config(format!(
                "raster dimensions collapsed to {}x{} at cell size {}; raise the cell budget",
                width, height, cell
            )));
        }

        Ok(Resolution {
            cell_size: cell,
            width,
            height,
        })
    }

    /// Rasterizes a labeled collection.
    ///
    /// Cluster IDs are burned with all-touched semantics (any cell a
    /// geometry partially overlaps receives its value) in input order, so
    /// later features overwrite earlier ones. Untouched cells keep the fill
    /// policy's value, which also becomes the grid's nodata.
    pub fn rasterize(&self, collection: &LabeledCollection) -> Result<RasterGrid> {
        let bounds = ops::bounding_box(
            collection.features.iter().map(|lf| &lf.feature.geometry),
        )?;
        info!(
            "initial bounds: x_min={}, y_min={}, x_max={}, y_max={}",
            bounds.0, bounds.1, bounds.2, bounds.3
        );

        let resolution =
            Self::resolve_resolution(bounds, self.config.cell_size, self.config.max_cells)?;
        let transform = GridTransform::from_origin(bounds.0, bounds.3, resolution.cell_size);

        let mut grid = RasterGrid::filled(
            resolution.width,
            resolution.height,
            transform,
            self.config.fill.fill_value(),
            collection.crs,
        );

        for lf in &collection.features {
            burn_geometry(&mut grid, &lf.feature.geometry, lf.cluster as f32);
        }

        info!(
            "raster created with dimensions: {} x {}",
            resolution.width, resolution.height
        );
        Ok(grid)
    }
}

/// Burns one geometry's value into every cell it touches.
fn burn_geometry(grid: &mut RasterGrid, geometry: &Geometry<f64>, value: f32) {
    match geometry {
        Geometry::Point(point) => burn_point(grid, point.x(), point.y(), value),
        Geometry::MultiPoint(points) => {
            for point in points {
                burn_point(grid, point.x(), point.y(), value);
            }
        }
        other => burn_extended(grid, other, value),
    }
}

fn burn_point(grid: &mut RasterGrid, x: f64, y: f64, value: f32) {
    let (row, col) = grid.transform.cell_of(x, y);
    if row >= 0 && col >= 0 && (row as usize) < grid.height() && (col as usize) < grid.width() {
        grid.data[[row as usize, col as usize]] = value;
    }
}

/// All-touched burn for geometries with extent: every candidate cell inside
/// the geometry's bounding box is tested for intersection with the cell
/// rectangle.
fn burn_extended(grid: &mut RasterGrid, geometry: &Geometry<f64>, value: f32) {
    let Some(rect) = geometry.bounding_rect() else {
        return;
    };

    let (height, width) = (grid.height() as i64, grid.width() as i64);
    let (row_min, col_min) = grid.transform.cell_of(rect.min().x, rect.max().y);
    let (row_max, col_max) = grid.transform.cell_of(rect.max().x, rect.min().y);
    if row_min >= height || col_min >= width || row_max < 0 || col_max < 0 {
        return;
    }

    let row_range = row_min.max(0) as usize..=row_max.min(height - 1) as usize;
    let col_range = col_min.max(0) as usize..=col_max.min(width - 1) as usize;

    for row in row_range {
        for col in col_range.clone() {
            let cell = grid.transform.cell_bounds(row, col).to_polygon();
            if geometry.intersects(&cell) {
                grid.data[[row, col]] = value;
            }
        }
    }
}
