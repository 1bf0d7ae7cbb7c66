//! Aspect surface: compass bearing of the downslope direction.
//!
//! Uses the shared Horn (1981) gradient from `super::gradient`. Cells whose
//! gradient is exactly zero get [`FLAT_ASPECT`] instead of a bearing.
use crate::raster::Raster;
use crate::tables::FLAT_ASPECT;
use super::gradient::horn_gradient;

/// Downslope bearing in degrees, 0 = North, clockwise, in [0°, 360°).
/// Returns [`FLAT_ASPECT`] when both components are zero.
///
///   aspect = atan2(−dz_dx, −dz_dy) × 180/π, normalised to [0°, 360°)
pub fn aspect_degrees(dz_dx: f64, dz_dy: f64) -> f32 {
    if dz_dx == 0.0 && dz_dy == 0.0 {
        return FLAT_ASPECT;
    }
    let mut bearing = (-dz_dx).atan2(-dz_dy).to_degrees() as f32;
    if bearing < 0.0 {
        bearing += 360.0;
    }
    // Rounding can land on 360; -0.0 folds to 0.
    if bearing >= 360.0 || bearing == 0.0 {
        bearing = 0.0;
    }
    bearing
}

/// Aspect surface of `dem`, on the DEM's grid.
pub fn aspect(dem: &Raster) -> Raster {
    dem.generate_rows(|r, out| {
        for (c, dst) in out.iter_mut().enumerate() {
            if let Some((dz_dx, dz_dy)) = horn_gradient(dem, r, c) {
                *dst = aspect_degrees(dz_dx, dz_dy);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn plane(n: usize, east_rise: f32, south_rise: f32) -> Raster {
        let mut data = Vec::with_capacity(n * n);
        for r in 0..n {
            for c in 0..n {
                data.push(c as f32 * east_rise + r as f32 * south_rise);
            }
        }
        Raster::new(n, n, 10.0, data).unwrap()
    }

    #[test]
    fn compass_convention() {
        // Rising east faces west; rising south faces north.
        assert_abs_diff_eq!(aspect_degrees(1.0, 0.0), 270.0);
        assert_abs_diff_eq!(aspect_degrees(-1.0, 0.0), 90.0);
        assert_abs_diff_eq!(aspect_degrees(0.0, -1.0), 0.0);
        assert_abs_diff_eq!(aspect_degrees(0.0, 1.0), 180.0);
        assert_abs_diff_eq!(aspect_degrees(-1.0, 1.0), 135.0, epsilon = 1e-4);
        assert_eq!(aspect_degrees(0.0, 0.0), FLAT_ASPECT);
    }

    #[test]
    fn north_facing_bearing_is_zero_not_negative() {
        let a = aspect_degrees(-0.0, -2.0);
        assert_eq!(a, 0.0);
        assert!(a.is_sign_positive());
    }

    #[test]
    fn east_ramp_faces_west() {
        let a = aspect(&plane(6, 5.0, 0.0));
        for r in 1..5 {
            for c in 1..5 {
                assert_abs_diff_eq!(a.get(r, c), 270.0, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn north_sloping_plane_faces_south() {
        // Elevation grows northward (toward row 0), so downslope is south.
        let a = aspect(&plane(5, 0.0, -3.0));
        assert_abs_diff_eq!(a.get(2, 2), 180.0, epsilon = 1e-3);
    }

    #[test]
    fn flat_field_gets_flat_sentinel() {
        let a = aspect(&Raster::filled(5, 5, 30.0, 12.0).unwrap());
        assert_eq!(a.value(2, 2), Some(FLAT_ASPECT));
        assert_eq!(a.value(0, 0), None);
    }
}
