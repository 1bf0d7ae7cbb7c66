//! Slope and aspect surfaces derived from a DEM.
pub mod aspect;
mod gradient;
pub mod slope;

pub use aspect::{aspect, aspect_degrees};
pub use slope::{slope, slope_degrees};
