//! Binary raster container.
//!
//! ## Format layout
//!
//! ```text
//! +---------------------+
//! | Magic "TSRG" (4)    |
//! | Version (2, LE)     |
//! | Header length (4)   |
//! +---------------------+
//! | Header (bincode)    |
//! +---------------------+
//! | Cell data           |
//! | (f32 LE, row-major) |
//! +---------------------+
//! ```
//!
//! The header carries everything needed to reconstruct the grid exactly:
//! width, height, transform, nodata and CRS.

use crate::error::{Result, TerrasomError};
use crate::feature::Epsg;
use crate::io::RasterStore;
use crate::raster::{GridTransform, RasterGrid};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic number for raster container files.
const MAGIC: &[u8; 4] = b"TSRG";

/// Current format version.
const VERSION: u16 = 1;

/// Raster container header.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RasterHeader {
    width: u32,
    height: u32,
    origin_x: f64,
    origin_y: f64,
    cell_size: f64,
    nodata: f32,
    crs: u32,
}

/// Raster I/O over the binary container format.
#[derive(Debug, Clone, Default)]
pub struct BinaryRasterStore;

impl RasterStore for BinaryRasterStore {
    fn save(&self, grid: &RasterGrid, path: &Path) -> Result<()> {
        let header = RasterHeader {
            width: grid.width() as u32,
            height: grid.height() as u32,
            origin_x: grid.transform.origin_x,
            origin_y: grid.transform.origin_y,
            cell_size: grid.transform.cell_size,
            nodata: grid.nodata,
            crs: grid.crs.0,
        };
        let header_bytes = bincode::serialize(&header)?;

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&(header_bytes.len() as u32).to_le_bytes())?;
        writer.write_all(&header_bytes)?;
        for &value in grid.data.iter() {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<RasterGrid> {
        if !path.exists() {
            return Err(TerrasomError::FileNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(TerrasomError::InvalidRasterFormat(
                "bad magic number".to_string(),
            ));
        }

        let mut version = [0u8; 2];
        reader.read_exact(&mut version)?;
        let version = u16::from_le_bytes(version);
        if version != VERSION {
            return Err(TerrasomError::InvalidRasterFormat(format!(
                "unsupported version {}",
                version
            )));
        }

        let mut header_len = [0u8; 4];
        reader.read_exact(&mut header_len)?;
        let mut header_bytes = vec![0u8; u32::from_le_bytes(header_len) as usize];
        reader.read_exact(&mut header_bytes)?;
        let header: RasterHeader = bincode::deserialize(&header_bytes)?;

        let (width, height) = (header.width as usize, header.height as usize);
        let mut data_bytes = vec![0u8; width * height * 4];
        reader.read_exact(&mut data_bytes)?;
        let values: Vec<f32> = data_bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        let data = Array2::from_shape_vec((height, width), values).map_err(|e| {
            TerrasomError::InvalidRasterFormat(format!("cell data does not fit shape: {}", e))
        })?;

        Ok(RasterGrid {
            data,
            transform: GridTransform {
                origin_x: header.origin_x,
                origin_y: header.origin_y,
                cell_size: header.cell_size,
            },
            nodata: header.nodata,
            crs: Epsg(header.crs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_load_roundtrip_is_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.tsr");

        let mut grid = RasterGrid::filled(
            3,
            2,
            GridTransform::from_origin(-8.5, 41.2, 0.25),
            -1.0,
            Epsg(3763),
        );
        grid.data[[0, 0]] = 4.0;
        grid.data[[1, 2]] = 17.5;

        BinaryRasterStore.save(&grid, &path).unwrap();
        let loaded = BinaryRasterStore.load(&path).unwrap();

        assert_eq!(loaded, grid);
    }

    #[test]
    fn test_load_rejects_bad_magic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bogus.tsr");
        std::fs::write(&path, b"NOPE0000").unwrap();

        let err = BinaryRasterStore.load(&path).unwrap_err();
        assert!(matches!(err, TerrasomError::InvalidRasterFormat(_)));
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let err = BinaryRasterStore.load(Path::new("/no/such/grid.tsr")).unwrap_err();
        assert!(matches!(err, TerrasomError::FileNotFound(_)));
    }
}
