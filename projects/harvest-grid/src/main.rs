mod cli;
mod export;
mod pipeline;
mod run_artifacts;
mod run_context;

use anyhow::Result;
use cli::Args;
use run_context::RunConfig;

fn main() -> Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse_args();

    let config = RunConfig::load(&args.config)?;
    let mut settings = config.settings()?;
    if let Some(cell_size) = args.cell_size {
        settings.cell_size = cell_size;
    }
    if let Some(max_gap) = args.max_gap {
        settings.max_gap = max_gap;
    }
    if let Some(max_density) = args.max_density {
        settings.max_density = max_density;
    }

    let metadata = run_context::create_run(&args.output_root, &args.config)?;
    let summary = pipeline::orchestrator::run(&config, settings, &metadata)?;

    tracing::info!(
        run_id = %metadata.run_id,
        fields = summary.fields.len(),
        segments = summary.extraction.segments,
        "run complete"
    );

    Ok(())
}
