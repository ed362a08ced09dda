use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the run configuration JSON
    #[arg(long, env = "HARVEST_GRID_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    /// Root directory for run output artifacts
    #[arg(long, env = "HARVEST_GRID_OUTPUT_ROOT", default_value = "output")]
    pub output_root: PathBuf,

    /// Grid cell edge length override, in coordinate units
    #[arg(long)]
    pub cell_size: Option<f64>,

    /// Maximum sample gap override, in coordinate units
    #[arg(long)]
    pub max_gap: Option<f64>,

    /// Maximum accepted segment density override, in weight units per
    /// coordinate unit
    #[arg(long)]
    pub max_density: Option<f64>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
