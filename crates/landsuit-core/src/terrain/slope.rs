//! Slope surface (Horn method).
//!
//! Computes slope angle in degrees at every interior cell using Horn's (1981)
//! 3×3 weighted finite-difference gradient. Border cells and cells next to
//! no-data come out as no-data.
use crate::raster::Raster;
use super::gradient::horn_gradient;

/// `atan(√(dz_dx² + dz_dy²))` in degrees.
#[inline]
pub fn slope_degrees(dz_dx: f64, dz_dy: f64) -> f64 {
    (dz_dx * dz_dx + dz_dy * dz_dy).sqrt().atan().to_degrees()
}

/// Slope surface of `dem` in degrees, on the DEM's grid.
pub fn slope(dem: &Raster) -> Raster {
    dem.generate_rows(|r, out| {
        for (c, dst) in out.iter_mut().enumerate() {
            if let Some((dz_dx, dz_dy)) = horn_gradient(dem, r, c) {
                *dst = (slope_degrees(dz_dx, dz_dy) as f32).max(0.0);
            }
        }
    })
}
