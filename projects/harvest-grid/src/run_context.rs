use crate::pipeline::aggregate::DEFAULT_MAX_DENSITY;
use crate::pipeline::colorize::{DEFAULT_COLOR_HIGH, DEFAULT_COLOR_LOW};
use crate::pipeline::grid::DEFAULT_CELL_SIZE;
use crate::pipeline::segments::DEFAULT_MAX_GAP;
use crate::pipeline::types::{Field, Rgb};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use geo_types::{LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One corner of a field boundary, in configuration axis order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Corner {
    pub latitude: f64,
    pub longitude: f64,
}

/// A field boundary as written in config.json: four named corners.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FieldBoundaryConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "NW_corner")]
    pub nw_corner: Corner,
    #[serde(rename = "NE_corner")]
    pub ne_corner: Corner,
    #[serde(rename = "SE_corner")]
    pub se_corner: Corner,
    #[serde(rename = "SW_corner")]
    pub sw_corner: Corner,
}

/// Top-level run configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunConfig {
    pub field_boundaries: Vec<FieldBoundaryConfig>,
    pub csv_filepath: PathBuf,
    #[serde(default)]
    pub cell_size: Option<f64>,
    #[serde(default)]
    pub max_gap: Option<f64>,
    #[serde(default)]
    pub max_density: Option<f64>,
    #[serde(default)]
    pub color_low: Option<String>,
    #[serde(default)]
    pub color_high: Option<String>,
}

/// Thresholds and scale endpoints in effect for one run, after defaults and
/// CLI overrides are applied.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub cell_size: f64,
    pub max_gap: f64,
    pub max_density: f64,
    pub ramp_low: Rgb,
    pub ramp_high: Rgb,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at: {:?}", path))?;
        Self::from_json(&content).with_context(|| format!("Invalid config at: {:?}", path))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(content)?;
        if config.field_boundaries.is_empty() {
            anyhow::bail!("config declares no field boundaries");
        }
        Ok(config)
    }

    /// Build the configured fields. Unnamed fields get `field_N`, 1-based,
    /// matching their position in the config.
    pub fn fields(&self) -> Vec<Field> {
        self.field_boundaries
            .iter()
            .enumerate()
            .map(|(i, fb)| {
                let name = fb
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("field_{}", i + 1));
                // Internal axis convention: x = latitude, y = longitude.
                let corners = [fb.nw_corner, fb.ne_corner, fb.se_corner, fb.sw_corner];
                let ring: Vec<(f64, f64)> =
                    corners.iter().map(|c| (c.latitude, c.longitude)).collect();
                Field {
                    name,
                    boundary: Polygon::new(LineString::from(ring), vec![]),
                }
            })
            .collect()
    }

    pub fn settings(&self) -> Result<Settings> {
        let parse_color = |value: &Option<String>, fallback: Rgb| -> Result<Rgb> {
            match value {
                Some(s) => Rgb::from_hex(s)
                    .with_context(|| format!("invalid color in config: {:?}", s)),
                None => Ok(fallback),
            }
        };
        Ok(Settings {
            cell_size: self.cell_size.unwrap_or(DEFAULT_CELL_SIZE),
            max_gap: self.max_gap.unwrap_or(DEFAULT_MAX_GAP),
            max_density: self.max_density.unwrap_or(DEFAULT_MAX_DENSITY),
            ramp_low: parse_color(&self.color_low, DEFAULT_COLOR_LOW)?,
            ramp_high: parse_color(&self.color_high, DEFAULT_COLOR_HIGH)?,
        })
    }
}

/// Metadata written alongside the artifacts of a single run.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunMetadata {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub config_path: String,
    #[serde(skip)]
    pub output_dir: PathBuf,
}

/// Create a timestamped run directory under the output root and persist the
/// run metadata into it.
pub fn create_run(output_root: &Path, config_path: &Path) -> Result<RunMetadata> {
    let created_at = Utc::now();
    let run_id = created_at.format("run_%Y%m%d_%H%M%S").to_string();
    let output_dir = output_root.join(&run_id);
    if output_dir.exists() {
        anyhow::bail!("Output directory already exists for: {}", run_id);
    }
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create run directory at: {:?}", output_dir))?;

    let metadata = RunMetadata {
        run_id,
        created_at,
        config_path: config_path.display().to_string(),
        output_dir: output_dir.clone(),
    };

    let metadata_path = output_dir.join("metadata.json");
    let content = serde_json::to_string_pretty(&metadata)?;
    fs::write(metadata_path, content)?;

    Ok(metadata)
}
