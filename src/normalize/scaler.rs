//! Min-max scaling parameters.

use crate::error::{Result, TerrasomError};
use serde::{Deserialize, Serialize};

/// Scaling parameters for one vector dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimScale {
    /// Minimum observed value.
    pub min: f64,
    /// Observed value range (`max - min`).
    pub range: f64,
}

impl DimScale {
    /// True if the dimension carries no information (zero or negative range).
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.range <= 0.0
    }
}

/// Per-dimension min-max scaling computed once over the full dataset.
///
/// Degenerate dimensions (zero range) scale every value to `0.0` rather than
/// failing; callers surface that through the logging layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    /// One scale per vector dimension.
    pub dims: Vec<DimScale>,
}

impl NormalizationParams {
    /// Fits scaling parameters over a rectangular table of rows.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let first = rows
            .first()
            .ok_or_else(|| TerrasomError::Config("cannot fit scaler on an empty table".to_string()))?;
        let width = first.len();

        let mut mins = vec![f64::INFINITY; width];
        let mut maxs = vec![f64::NEG_INFINITY; width];

        for row in rows {
            debug_assert_eq!(row.len(), width, "rows must have identical length");
            for (d, &value) in row.iter().enumerate() {
                mins[d] = mins[d].min(value);
                maxs[d] = maxs[d].max(value);
            }
        }

        let dims = mins
            .into_iter()
            .zip(maxs)
            .map(|(min, max)| DimScale { min, range: max - min })
            .collect();

        Ok(Self { dims })
    }

    /// Number of dimensions the parameters were fit over.
    #[inline]
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    /// True if no dimensions were fit.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Scales one row to `[0, 1]` per dimension.
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        debug_assert_eq!(row.len(), self.dims.len());
        row.iter()
            .zip(&self.dims)
            .map(|(&value, scale)| {
                if scale.is_degenerate() {
                    0.0
                } else {
                    (value - scale.min) / scale.range
                }
            })
            .collect()
    }

    /// Indices of degenerate dimensions.
    pub fn degenerate_dims(&self) -> Vec<usize> {
        self.dims
            .iter()
            .enumerate()
            .filter(|(_, scale)| scale.is_degenerate())
            .map(|(d, _)| d)
            .collect()
    }
}
