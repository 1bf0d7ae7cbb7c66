//! Error types for the suitability core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which of the two weighting scalars an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightKind {
    Slope,
    Aspect,
}

impl fmt::Display for WeightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightKind::Slope => f.write_str("slope"),
            WeightKind::Aspect => f.write_str("aspect"),
        }
    }
}

/// Grid geometry reported in shape mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: f64,
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} @ {}", self.rows, self.cols, self.cell_size)
    }
}

/// Errors raised while validating inputs or computing a suitability raster.
#[derive(Error, Debug)]
pub enum SuitabilityError {
    /// The optional analysis capability could not be checked out.
    #[error("capability '{capability}' is not available")]
    CapabilityUnavailable { capability: String },

    /// A weight fell outside [0, 1].
    #[error("{weight} weight {value} must fall between 0 and 1")]
    WeightRange { weight: WeightKind, value: f64 },

    /// The two weights do not add up to exactly 1.0.
    #[error("slope weight {slope} and aspect weight {aspect} must add up to 1")]
    WeightSum { slope: f64, aspect: f64 },

    /// A weight parameter is not a number.
    #[error("{weight} weight '{input}' is not a number")]
    WeightParse { weight: WeightKind, input: String },

    /// A reclassification table is empty or malformed.
    #[error("malformed reclassification table: {0}")]
    Schema(String),

    /// Two rasters combined cell-wise have different grids.
    #[error("raster shape mismatch: {left} vs {right}")]
    ShapeMismatch { left: GridShape, right: GridShape },

    /// Raster dimensions, data length or cell size are inconsistent.
    #[error("invalid raster: {0}")]
    InvalidRaster(String),

    /// The raster source has nothing under the requested identifier.
    #[error("raster not found: {}", path.display())]
    RasterNotFound { path: PathBuf },

    /// Reading or writing a raster failed.
    #[error("raster I/O error at {}: {message}", path.display())]
    RasterIo { path: PathBuf, message: String },
}

/// Result type alias using [`SuitabilityError`].
pub type Result<T> = std::result::Result<T, SuitabilityError>;
