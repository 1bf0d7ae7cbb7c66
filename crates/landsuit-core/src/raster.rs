use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{GridShape, Result, SuitabilityError};

/// Sentinel used when a raster does not declare its own no-data value.
pub const DEFAULT_NODATA: f32 = f32::MIN;

/// An immutable 2D grid of cell values, row-major, row 0 at the top (north).
/// Cell size is square and uniform; coordinate math uses f64, cell values f32.
///
/// A cell is no-data when it equals the sentinel or is NaN. Transforms never
/// touch an existing raster; they allocate a new one on the same grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RasterParts", into = "RasterParts")]
pub struct Raster {
    data: Vec<f32>,
    width: usize,
    height: usize,
    cell_size: f64,
    origin_x: f64,
    origin_y: f64,
    nodata: f32,
}

impl Raster {
    /// Build a raster with origin (0, 0) and [`DEFAULT_NODATA`].
    pub fn new(width: usize, height: usize, cell_size: f64, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SuitabilityError::InvalidRaster(format!(
                "dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let cells = cell_count(width, height)?;
        if data.len() != cells {
            return Err(SuitabilityError::InvalidRaster(format!(
                "expected {cells} cells for {width}x{height}, got {}",
                data.len()
            )));
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(SuitabilityError::InvalidRaster(format!(
                "cell size must be finite and positive, got {cell_size}"
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            cell_size,
            origin_x: 0.0,
            origin_y: 0.0,
            nodata: DEFAULT_NODATA,
        })
    }

    /// Create a raster filled with the given value.
    pub fn filled(width: usize, height: usize, cell_size: f64, fill: f32) -> Result<Self> {
        let cells = cell_count(width, height)?;
        Self::new(width, height, cell_size, vec![fill; cells])
    }

    /// Set the map coordinates of the upper-left corner.
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    /// Declare the no-data sentinel. Cells already holding this value become no-data.
    pub fn with_nodata(mut self, nodata: f32) -> Self {
        self.nodata = nodata;
        self
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    /// Cell value, or `None` when the cell is no-data.
    #[inline]
    pub fn value(&self, row: usize, col: usize) -> Option<f32> {
        let v = self.get(row, col);
        if self.is_nodata_value(v) {
            None
        } else {
            Some(v)
        }
    }

    #[inline]
    pub fn is_nodata_value(&self, v: f32) -> bool {
        v.is_nan() || v == self.nodata
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn nodata(&self) -> f32 {
        self.nodata
    }

    /// Upper-left corner in map units.
    pub fn origin(&self) -> (f64, f64) {
        (self.origin_x, self.origin_y)
    }

    /// `(min_x, min_y, max_x, max_y)` in map units.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        let max_x = self.origin_x + self.width as f64 * self.cell_size;
        let min_y = self.origin_y - self.height as f64 * self.cell_size;
        (self.origin_x, min_y, max_x, self.origin_y)
    }

    /// Raw row-major cell values, sentinel included.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }

    pub fn grid_shape(&self) -> GridShape {
        GridShape {
            rows: self.height,
            cols: self.width,
            cell_size: self.cell_size,
        }
    }

    /// True when both rasters have identical width, height and cell size.
    pub fn same_grid(&self, other: &Raster) -> bool {
        self.width == other.width && self.height == other.height && self.cell_size == other.cell_size
    }

    pub fn ensure_same_grid(&self, other: &Raster) -> Result<()> {
        if self.same_grid(other) {
            Ok(())
        } else {
            Err(SuitabilityError::ShapeMismatch {
                left: self.grid_shape(),
                right: other.grid_shape(),
            })
        }
    }

    /// Number of cells holding a value.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&v| !self.is_nodata_value(v)).count()
    }

    /// Build a raster on this grid, one output row at a time. Every output row
    /// starts as no-data; `fill_row(r, out)` writes the cells it can compute.
    ///
    /// Derived rasters always carry [`DEFAULT_NODATA`], so an input sentinel
    /// such as 0 or -1 cannot collide with class values written here.
    pub(crate) fn generate_rows<F>(&self, fill_row: F) -> Raster
    where
        F: Fn(usize, &mut [f32]) + Send + Sync,
    {
        let mut data = vec![DEFAULT_NODATA; self.data.len()];

        #[cfg(feature = "threading")]
        {
            use rayon::prelude::*;
            data.par_chunks_mut(self.width)
                .enumerate()
                .for_each(|(r, out)| fill_row(r, out));
        }
        #[cfg(not(feature = "threading"))]
        {
            data.chunks_mut(self.width)
                .enumerate()
                .for_each(|(r, out)| fill_row(r, out));
        }

        Raster {
            data,
            width: self.width,
            height: self.height,
            cell_size: self.cell_size,
            origin_x: self.origin_x,
            origin_y: self.origin_y,
            nodata: DEFAULT_NODATA,
        }
    }

    /// Apply `f` to every valid cell; no-data stays no-data, and `None` from
    /// `f` becomes no-data.
    pub(crate) fn map_cells<F>(&self, f: F) -> Raster
    where
        F: Fn(f32) -> Option<f32> + Send + Sync,
    {
        self.generate_rows(|r, out| {
            for (dst, &v) in out.iter_mut().zip(self.row(r)) {
                if self.is_nodata_value(v) {
                    continue;
                }
                if let Some(mapped) = f(v) {
                    *dst = mapped;
                }
            }
        })
    }

    /// Combine two rasters on the same grid cell by cell. A cell is no-data in
    /// the output when it is no-data in either input.
    pub(crate) fn zip_cells<F>(&self, other: &Raster, f: F) -> Result<Raster>
    where
        F: Fn(f32, f32) -> f32 + Send + Sync,
    {
        self.ensure_same_grid(other)?;
        Ok(self.generate_rows(|r, out| {
            for ((dst, &a), &b) in out.iter_mut().zip(self.row(r)).zip(other.row(r)) {
                if self.is_nodata_value(a) || other.is_nodata_value(b) {
                    continue;
                }
                *dst = f(a, b);
            }
        }))
    }
}

fn cell_count(width: usize, height: usize) -> Result<usize> {
    width.checked_mul(height).ok_or_else(|| {
        SuitabilityError::InvalidRaster(format!("{width}x{height} cells overflow the address space"))
    })
}

// ── Serde representation ─────────────────────────────────────────────────────

/// On-disk layout. NaN cells serialise as JSON `null` and read back as NaN.
#[derive(Serialize, Deserialize)]
struct RasterParts {
    width: usize,
    height: usize,
    cell_size: f64,
    origin_x: f64,
    origin_y: f64,
    #[serde(deserialize_with = "null_as_nan")]
    nodata: f32,
    #[serde(deserialize_with = "null_as_nan_vec")]
    data: Vec<f32>,
}

fn null_as_nan<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f32, D::Error> {
    Ok(Option::<f32>::deserialize(d)?.unwrap_or(f32::NAN))
}

fn null_as_nan_vec<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<f32>, D::Error> {
    let v: Vec<Option<f32>> = Vec::deserialize(d)?;
    Ok(v.into_iter().map(|x| x.unwrap_or(f32::NAN)).collect())
}

impl TryFrom<RasterParts> for Raster {
    type Error = SuitabilityError;

    fn try_from(p: RasterParts) -> Result<Self> {
        Ok(Raster::new(p.width, p.height, p.cell_size, p.data)?
            .with_origin(p.origin_x, p.origin_y)
            .with_nodata(p.nodata))
    }
}

impl From<Raster> for RasterParts {
    fn from(r: Raster) -> Self {
        Self {
            width: r.width,
            height: r.height,
            cell_size: r.cell_size,
            origin_x: r.origin_x,
            origin_y: r.origin_y,
            nodata: r.nodata,
            data: r.data,
        }
    }
}
