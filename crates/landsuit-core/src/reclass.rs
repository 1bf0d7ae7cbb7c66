//! Reclassification of cell values through exact-value or range tables.
//!
//! Tables are plain data handed to one generic traversal, so the domain
//! constants in [`crate::tables`] can be inspected and tested on their own.

use std::collections::BTreeMap;

use crate::error::{Result, SuitabilityError};
use crate::raster::Raster;

/// Exact integer matches: `input -> output`. Unlisted values become no-data.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable {
    entries: BTreeMap<i64, f32>,
}

impl ValueTable {
    /// Fails with [`SuitabilityError::Schema`] on an empty table or a repeated key.
    pub fn new(pairs: &[(i64, f32)]) -> Result<Self> {
        if pairs.is_empty() {
            return Err(SuitabilityError::Schema("value table is empty".into()));
        }
        let mut entries = BTreeMap::new();
        for &(key, out) in pairs {
            if entries.insert(key, out).is_some() {
                return Err(SuitabilityError::Schema(format!(
                    "value table repeats key {key}"
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Output class for `v`, if `v` is an integral value present in the table.
    pub fn lookup(&self, v: f32) -> Option<f32> {
        if !v.is_finite() || v.fract() != 0.0 {
            return None;
        }
        self.entries.get(&(v as i64)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One half-open interval `[low, high) -> value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeClass {
    pub low: f64,
    pub high: f64,
    pub value: f32,
}

impl RangeClass {
    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.low && v < self.high
    }
}

/// Ordered half-open intervals. The first interval containing a value wins;
/// a value matching none becomes no-data.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeTable {
    classes: Vec<RangeClass>,
}

impl RangeTable {
    /// `ranges` are `(low inclusive, high exclusive, output)` in evaluation order.
    pub fn new(ranges: &[(f64, f64, f32)]) -> Result<Self> {
        if ranges.is_empty() {
            return Err(SuitabilityError::Schema("range table is empty".into()));
        }
        let mut classes = Vec::with_capacity(ranges.len());
        for &(low, high, value) in ranges {
            if !low.is_finite() || !high.is_finite() {
                return Err(SuitabilityError::Schema(format!(
                    "range [{low}, {high}) has a non-finite bound"
                )));
            }
            if low >= high {
                return Err(SuitabilityError::Schema(format!(
                    "range [{low}, {high}) is empty"
                )));
            }
            classes.push(RangeClass { low, high, value });
        }
        Ok(Self { classes })
    }

    pub fn lookup(&self, v: f32) -> Option<f32> {
        let v = f64::from(v);
        self.classes.iter().find(|c| c.contains(v)).map(|c| c.value)
    }

    pub fn classes(&self) -> &[RangeClass] {
        &self.classes
    }
}

/// A reclassification rule: exact-value lookup or ordered ranges.
#[derive(Debug, Clone, PartialEq)]
pub enum ReclassRule {
    Value(ValueTable),
    Range(RangeTable),
}

pub fn reclassify_by_value(raster: &Raster, table: &ValueTable) -> Raster {
    raster.map_cells(|v| table.lookup(v))
}

pub fn reclassify_by_range(raster: &Raster, table: &RangeTable) -> Raster {
    raster.map_cells(|v| table.lookup(v))
}

pub fn reclassify(raster: &Raster, rule: &ReclassRule) -> Raster {
    match rule {
        ReclassRule::Value(table) => reclassify_by_value(raster, table),
        ReclassRule::Range(table) => reclassify_by_range(raster, table),
    }
}
