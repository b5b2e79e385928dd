//! I/O capability interfaces and the provided backends.
//!
//! The pipeline is polymorphic over these traits so alternate formats and
//! in-memory test doubles can substitute without touching the clustering or
//! rasterization logic.

mod geojson;
mod raster_format;

pub use self::geojson::GeoJsonStore;
pub use raster_format::BinaryRasterStore;

use crate::cluster::LabeledCollection;
use crate::error::Result;
use crate::feature::FeatureCollection;
use crate::raster::RasterGrid;
use std::path::Path;

/// Loads and saves geometry-bearing feature collections.
pub trait FeatureStore {
    /// Loads an ordered feature collection.
    fn load(&self, path: &Path) -> Result<FeatureCollection>;

    /// Saves labeled features, preserving input order.
    fn save(&self, collection: &LabeledCollection, path: &Path) -> Result<()>;
}

/// Loads and saves raster grids with their metadata.
pub trait RasterStore {
    /// Saves a grid; width, height, transform, nodata and CRS must survive a
    /// round-trip exactly.
    fn save(&self, grid: &RasterGrid, path: &Path) -> Result<()>;

    /// Loads a grid saved by [`RasterStore::save`].
    fn load(&self, path: &Path) -> Result<RasterGrid>;
}
