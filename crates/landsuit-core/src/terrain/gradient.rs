//! Shared Horn (1981) 3×3 gradient used by slope and aspect.
//! Crate-private; not re-exported from `terrain`.

use crate::raster::Raster;

/// Horn (1981) weighted 3×3 gradient at cell `(r, c)`.
///
/// Returns `(dz_dx, dz_dy)` as dimensionless rise/run, x positive east and
/// y positive north. `None` for border cells and for any window holding
/// no-data (centre included); those cells are never extrapolated.
///
/// 3×3 neighbourhood layout (row 0 is north):
/// ```text
///   NW(-1,-1)  N(-1, 0)  NE(-1,+1)
///   W ( 0,-1)  *         E ( 0,+1)
///   SW(+1,-1)  S(+1, 0)  SE(+1,+1)
/// ```
///
/// `dz/dx = ((NE + 2E + SE) − (NW + 2W + SW)) / (8 · cellsize)`
/// `dz/dy = ((NW + 2N + NE) − (SW + 2S + SE)) / (8 · cellsize)`
pub(crate) fn horn_gradient(dem: &Raster, r: usize, c: usize) -> Option<(f64, f64)> {
    if r == 0 || c == 0 || r + 1 >= dem.height() || c + 1 >= dem.width() {
        return None;
    }

    let mut z = [[0.0f64; 3]; 3];
    for (dr, row) in z.iter_mut().enumerate() {
        for (dc, cell) in row.iter_mut().enumerate() {
            *cell = f64::from(dem.value(r + dr - 1, c + dc - 1)?);
        }
    }

    let [[nw, n, ne], [w, _, e], [sw, s, se]] = z;
    let cellsize = dem.cell_size();

    let dz_dx = ((ne + 2.0 * e + se) - (nw + 2.0 * w + sw)) / (8.0 * cellsize);
    let dz_dy = ((nw + 2.0 * n + ne) - (sw + 2.0 * s + se)) / (8.0 * cellsize);
    Some((dz_dx, dz_dy))
}
