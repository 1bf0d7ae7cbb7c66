//! Land suitability tool: reads a DEM and a land-use raster from a workspace,
//! writes the weighted slope/aspect suitability raster back into it.
//!
//! Logging follows `RUST_LOG` (default `landsuit=info,landsuit_core=info`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use landsuit_core::{StaticGate, SuitabilityJob, SuitabilityPipeline, Workspace, DEFAULT_CAPABILITY};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "landsuit", version, about = "Model land suitability from a DEM and a land-use raster")]
struct Args {
    /// Workspace directory; relative raster names resolve against it.
    #[arg(short, long, env = "LANDSUIT_WORKSPACE", default_value = ".")]
    workspace: PathBuf,

    /// Output raster name (.tif, .tiff or .json; no extension means .tif).
    #[arg(short, long)]
    output: String,

    /// DEM raster name or path.
    #[arg(long)]
    dem: String,

    /// Land-use raster name or path.
    #[arg(long)]
    land_use: String,

    /// Slope weight in [0, 1]; slope + aspect must equal 1.
    #[arg(long, allow_hyphen_values = true)]
    slope_weight: String,

    /// Aspect weight in [0, 1]; slope + aspect must equal 1.
    #[arg(long, allow_hyphen_values = true)]
    aspect_weight: String,

    /// Also save every intermediate layer next to the output.
    #[arg(long)]
    keep_intermediates: bool,

    /// Capability to check out for the run.
    #[arg(long, default_value = DEFAULT_CAPABILITY)]
    capability: String,

    /// Capabilities this installation can grant.
    #[arg(
        long,
        env = "LANDSUIT_CAPABILITIES",
        value_delimiter = ',',
        default_value = DEFAULT_CAPABILITY
    )]
    available_capabilities: Vec<String>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "landsuit=info,landsuit_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let workspace = Workspace::new(&args.workspace);
    let gate = StaticGate::new(args.available_capabilities.iter().map(|c| c.trim().to_string()));
    let job = SuitabilityJob {
        output: args.output,
        dem: args.dem,
        land_use: args.land_use,
        slope_weight: args.slope_weight,
        aspect_weight: args.aspect_weight,
        capability: args.capability,
        keep_intermediates: args.keep_intermediates,
    };

    tracing::info!(
        workspace = %workspace.root().display(),
        dem = %job.dem,
        land_use = %job.land_use,
        output = %job.output,
        "starting land suitability run"
    );

    let pipeline = SuitabilityPipeline::new()?;
    let result = pipeline
        .run_job(&job, &workspace, &workspace, &gate)
        .with_context(|| format!("land suitability run for '{}' failed", job.output))?;

    tracing::info!(
        path = %workspace.resolve(&job.output).display(),
        valid_cells = result.valid_count(),
        "suitability raster written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn weights_are_taken_as_text() {
        let args = Args::try_parse_from([
            "landsuit",
            "--workspace",
            "/tmp/ws",
            "--output",
            "suit",
            "--dem",
            "dem.tif",
            "--land-use",
            "lu.tif",
            "--slope-weight",
            "-0.5",
            "--aspect-weight",
            "1.5",
        ])
        .unwrap();
        assert_eq!(args.slope_weight, "-0.5");
        assert_eq!(args.aspect_weight, "1.5");
        assert_eq!(args.capability, "spatial");
        assert!(!args.keep_intermediates);
    }
}
