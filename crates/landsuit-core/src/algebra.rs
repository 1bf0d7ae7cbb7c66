//! Cell-wise raster arithmetic with no-data propagation.
use crate::error::Result;
use crate::raster::Raster;

/// Multiply every valid cell by `scalar`.
pub fn scale(raster: &Raster, scalar: f64) -> Raster {
    raster.map_cells(|v| Some((f64::from(v) * scalar) as f32))
}

/// Cell-wise sum. Fails with `ShapeMismatch` unless both grids match.
pub fn add(a: &Raster, b: &Raster) -> Result<Raster> {
    a.zip_cells(b, |x, y| x + y)
}

/// Cell-wise product. Fails with `ShapeMismatch` unless both grids match.
pub fn multiply(a: &Raster, b: &Raster) -> Result<Raster> {
    a.zip_cells(b, |x, y| x * y)
}
