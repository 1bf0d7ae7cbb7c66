//! Land suitability from a DEM and a land-use raster.
//!
//! Slope and aspect are derived from the DEM, reclassified through fixed
//! tables, weighted, summed and masked by the reclassified land use:
//!
//! ```text
//! suitability = (slope_class × w_slope + aspect_class × w_aspect) × land_use_mask
//! ```
//!
//! Raster I/O, the licence gate and progress reporting sit behind the traits
//! in [`store`], [`capability`] and [`progress`].

pub mod algebra;
pub mod capability;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod raster;
pub mod reclass;
pub mod store;
pub mod tables;
pub mod terrain;
pub mod weights;

pub use capability::{acquire, CapabilityGate, CapabilityLease, StaticGate};
pub use error::{Result, SuitabilityError, WeightKind};
pub use pipeline::{Stages, SuitabilityJob, SuitabilityPipeline, DEFAULT_CAPABILITY};
pub use progress::{ProgressSink, TracingProgress};
pub use raster::{Raster, DEFAULT_NODATA};
pub use reclass::{reclassify, reclassify_by_range, reclassify_by_value, RangeTable, ReclassRule, ValueTable};
pub use store::{RasterSink, RasterSource, Workspace};
pub use weights::{validate, Weights};
