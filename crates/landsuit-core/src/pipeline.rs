//! Pipeline orchestrator: runs the suitability stages in order.
//!
//! Validation happens before any raster work. Every stage sees the complete
//! output of the previous one, and a failure anywhere discards all
//! intermediates without exposing a partial result.

use std::path::Path;

use crate::algebra::{add, multiply, scale};
use crate::capability::{acquire, CapabilityGate};
use crate::error::Result;
use crate::progress::{ProgressSink, TracingProgress};
use crate::raster::Raster;
use crate::reclass::{reclassify, ReclassRule};
use crate::store::{RasterSink, RasterSource};
use crate::tables::{aspect_table, land_use_table, slope_table};
use crate::terrain::{aspect, slope};
use crate::weights::{validate, Weights};

/// Capability checked out around a job unless the job names another.
pub const DEFAULT_CAPABILITY: &str = "spatial";

// ── Public structs ────────────────────────────────────────────────────────────

/// Every layer produced by one pipeline run, in production order.
#[derive(Debug, Clone)]
pub struct Stages {
    pub land_use_mask: Raster,
    pub slope: Raster,
    pub slope_class: Raster,
    pub weighted_slope: Raster,
    pub aspect: Raster,
    pub aspect_class: Raster,
    pub weighted_aspect: Raster,
    pub combined: Raster,
    pub suitability: Raster,
}

impl Stages {
    /// Intermediate layers with the suffix used when saving them.
    pub fn intermediates(&self) -> [(&'static str, &Raster); 8] {
        [
            ("landuse_mask", &self.land_use_mask),
            ("slope", &self.slope),
            ("slope_class", &self.slope_class),
            ("slope_weighted", &self.weighted_slope),
            ("aspect", &self.aspect),
            ("aspect_class", &self.aspect_class),
            ("aspect_weighted", &self.weighted_aspect),
            ("combined", &self.combined),
        ]
    }
}

/// Parameters of one end-to-end run, as supplied by the parameter source.
#[derive(Debug, Clone)]
pub struct SuitabilityJob {
    pub output: String,
    pub dem: String,
    pub land_use: String,
    /// Weights arrive as text and are parsed inside the capability scope.
    pub slope_weight: String,
    pub aspect_weight: String,
    pub capability: String,
    /// Also save each intermediate layer next to the output.
    pub keep_intermediates: bool,
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// The suitability pipeline, holding the reclassification rules it applies.
pub struct SuitabilityPipeline {
    slope_rule: ReclassRule,
    aspect_rule: ReclassRule,
    land_use_rule: ReclassRule,
    progress: Box<dyn ProgressSink>,
}

impl SuitabilityPipeline {
    /// Pipeline over the built-in domain tables, reporting through `tracing`.
    pub fn new() -> Result<Self> {
        Ok(Self {
            slope_rule: ReclassRule::Range(slope_table()?),
            aspect_rule: ReclassRule::Range(aspect_table()?),
            land_use_rule: ReclassRule::Value(land_use_table()?),
            progress: Box::new(TracingProgress),
        })
    }

    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Compute the suitability raster for `dem` and `land_use`.
    pub fn run(&self, dem: &Raster, land_use: &Raster, slope_weight: f64, aspect_weight: f64) -> Result<Raster> {
        Ok(self.run_stages(dem, land_use, slope_weight, aspect_weight)?.suitability)
    }

    /// Run the full pipeline and keep every intermediate layer.
    ///
    /// Pipeline order:
    ///   1. Weight validation, then DEM/land-use grid check
    ///   2. Land-use reclassification → binary mask
    ///   3. Slope → slope class → × slope weight
    ///   4. Aspect → aspect class → × aspect weight
    ///   5. Weighted slope + weighted aspect
    ///   6. × land-use mask
    pub fn run_stages(
        &self,
        dem: &Raster,
        land_use: &Raster,
        slope_weight: f64,
        aspect_weight: f64,
    ) -> Result<Stages> {
        // ── 1. Fail fast ────────────────────────────────────────────────────
        validate(slope_weight, aspect_weight)?;
        dem.ensure_same_grid(land_use)?;

        self.report("Beginning calculations");

        // ── 2. Land-use mask ────────────────────────────────────────────────
        self.report("Reclassifying land use");
        let land_use_mask = reclassify(land_use, &self.land_use_rule);

        // ── 3. Slope ────────────────────────────────────────────────────────
        self.report("Calculating slope");
        let slope = slope(dem);
        self.report("Reclassifying slope");
        let slope_class = reclassify(&slope, &self.slope_rule);
        self.report("Multiplying slope by weight");
        let weighted_slope = scale(&slope_class, slope_weight);

        // ── 4. Aspect ───────────────────────────────────────────────────────
        self.report("Calculating aspect");
        let aspect = aspect(dem);
        self.report("Reclassifying aspect");
        let aspect_class = reclassify(&aspect, &self.aspect_rule);
        self.report("Multiplying aspect by weight");
        let weighted_aspect = scale(&aspect_class, aspect_weight);

        // ── 5–6. Combine and mask ───────────────────────────────────────────
        self.report("Adding results");
        let combined = add(&weighted_slope, &weighted_aspect)?;
        self.report("Finalizing calculations");
        let suitability = multiply(&combined, &land_use_mask)?;

        tracing::debug!(
            valid_cells = suitability.valid_count(),
            total_cells = suitability.data().len(),
            "suitability computed"
        );

        Ok(Stages {
            land_use_mask,
            slope,
            slope_class,
            weighted_slope,
            aspect,
            aspect_class,
            weighted_aspect,
            combined,
            suitability,
        })
    }

    /// Run a whole job against external collaborators.
    ///
    /// The capability is checked out first and checked back in on every exit
    /// path. Nothing is written unless every stage succeeds, and the output is
    /// written before any intermediate layer.
    pub fn run_job(
        &self,
        job: &SuitabilityJob,
        source: &dyn RasterSource,
        sink: &dyn RasterSink,
        gate: &dyn CapabilityGate,
    ) -> Result<Raster> {
        let _lease = acquire(gate, &job.capability)?;
        self.report(&format!("Capability '{}' checked out", job.capability));

        let weights = Weights::parse(&job.slope_weight, &job.aspect_weight)?;
        let dem = source.load(&job.dem)?;
        let land_use = source.load(&job.land_use)?;

        let stages = self.run_stages(&dem, &land_use, weights.slope, weights.aspect)?;

        self.report("Saving final output to workspace");
        sink.save(&stages.suitability, &job.output)?;

        // Intermediates are extras: a failed save is logged and skipped, and
        // never turns a written output into a failed job.
        if job.keep_intermediates {
            for (suffix, raster) in stages.intermediates() {
                let id = intermediate_id(&job.output, suffix);
                if let Err(err) = sink.save(raster, &id) {
                    tracing::warn!(layer = suffix, id = %id, error = %err, "intermediate layer not saved");
                }
            }
        }

        self.report("Complete");
        Ok(stages.suitability)
    }

    fn report(&self, msg: &str) {
        self.progress.message(msg);
    }
}

/// `out/suit.tif` + `slope` → `out/suit_slope.tif`.
fn intermediate_id(output: &str, suffix: &str) -> String {
    let path = Path::new(output);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    };
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name).to_string_lossy().into_owned(),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intermediate_ids_keep_directory_and_extension() {
        assert_eq!(intermediate_id("suit.tif", "slope"), "suit_slope.tif");
        assert_eq!(intermediate_id("out/suit.json", "combined"), "out/suit_combined.json");
        assert_eq!(intermediate_id("suit", "aspect"), "suit_aspect");
    }

    #[test]
    fn domain_tables_are_tagged_by_kind() {
        let p = SuitabilityPipeline::new().unwrap();
        assert!(matches!(p.land_use_rule, ReclassRule::Value(_)));
        assert!(matches!(p.slope_rule, ReclassRule::Range(_)));
        assert!(matches!(p.aspect_rule, ReclassRule::Range(_)));
    }

    #[test]
    fn stage_outputs_share_the_dem_grid() {
        let dem = Raster::filled(5, 4, 25.0, 100.0).unwrap().with_origin(1000.0, 2000.0);
        let land_use = Raster::filled(5, 4, 25.0, 18.0).unwrap();
        let stages = SuitabilityPipeline::new()
            .unwrap()
            .run_stages(&dem, &land_use, 0.5, 0.5)
            .unwrap();
        for (name, layer) in stages.intermediates() {
            assert!(layer.same_grid(&dem), "{name} changed the grid");
            assert_eq!(layer.origin(), dem.origin(), "{name} moved the origin");
        }
        assert!(stages.suitability.same_grid(&dem));
    }
}
