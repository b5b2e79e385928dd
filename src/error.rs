//! Error types for the terrasom pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for terrasom operations.
#[derive(Error, Debug)]
pub enum TerrasomError {
    /// Invalid configuration (zero raster dimensions, unattainable cell
    /// budget, empty attribute list, empty training set, ...). Always fatal.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error during SOM training or inference, including vector-length
    /// contract violations between the map and its inputs.
    #[error("SOM error: {0}")]
    Som(String),

    /// Error raised by the geometry layer (empty geometry, missing centroid).
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid raster container format.
    #[error("Invalid raster format: {0}")]
    InvalidRasterFormat(String),
}

/// Result type alias for terrasom operations.
pub type Result<T> = std::result::Result<T, TerrasomError>;

impl From<bincode::Error> for TerrasomError {
    fn from(err: bincode::Error) -> Self {
        TerrasomError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for TerrasomError {
    fn from(err: serde_json::Error) -> Self {
        TerrasomError::Serialization(err.to_string())
    }
}

impl From<geojson::Error> for TerrasomError {
    fn from(err: geojson::Error) -> Self {
        TerrasomError::Serialization(err.to_string())
    }
}
