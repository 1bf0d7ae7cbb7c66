//! Fixed reclassification tables of the suitability model.
//!
//! Higher class = more suitable. Gentle slopes score 3, steep slopes 1.
//! Aspect scores flat and south-facing cells 3, east/west 2, north 1.
use crate::error::Result;
use crate::reclass::{RangeTable, ValueTable};

/// Marks a cell with no downslope direction in an aspect surface.
pub const FLAT_ASPECT: f32 = -1.0;

/// Slope in degrees: `[low, high) -> class`.
pub const SLOPE_RANGES: [(f64, f64, f32); 3] = [
    (0.0, 3.0, 3.0),
    (3.0, 6.0, 2.0),
    (6.0, 90.0, 1.0),
];

/// Aspect in compass degrees, with the flat sentinel caught by the first range.
pub const ASPECT_RANGES: [(f64, f64, f32); 6] = [
    (-1.0, 0.0, 3.0),
    (0.0, 45.0, 1.0),
    (45.0, 135.0, 2.0),
    (135.0, 225.0, 3.0),
    (225.0, 315.0, 2.0),
    (315.0, 360.0, 1.0),
];

/// Land-use class codes. Only 18 and 73 are suitable.
pub const LAND_USE_CLASSES: [(i64, f32); 22] = [
    (11, 0.0),
    (12, 0.0),
    (13, 0.0),
    (14, 0.0),
    (15, 0.0),
    (16, 0.0),
    (18, 1.0),
    (21, 0.0),
    (22, 0.0),
    (23, 0.0),
    (30, 0.0),
    (41, 0.0),
    (42, 0.0),
    (43, 0.0),
    (44, 0.0),
    (50, 0.0),
    (60, 0.0),
    (73, 1.0),
    (74, 0.0),
    (171, 0.0),
    (172, 0.0),
    (242, 0.0),
];

pub fn slope_table() -> Result<RangeTable> {
    RangeTable::new(&SLOPE_RANGES)
}

pub fn aspect_table() -> Result<RangeTable> {
    RangeTable::new(&ASPECT_RANGES)
}

pub fn land_use_table() -> Result<ValueTable> {
    ValueTable::new(&LAND_USE_CLASSES)
}
