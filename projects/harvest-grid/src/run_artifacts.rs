// Run artifact struct definitions
//
// This module contains the struct definitions for artifacts that are persisted
// as JSON files within a run's output directory.

use crate::pipeline::ingest::IngestSummary;
use crate::pipeline::types::ExtractionSummary;
use serde::{Deserialize, Serialize};

/// Properties attached to one grid-cell feature in the exported GeoJSON.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CellProperties {
    /// Accumulated raw yield, in weight units.
    pub yield_weight: f64,
    /// Area-normalized yield density.
    pub density: f64,
    /// Fill color as `#rrggbb`; absent for no-data cells.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// True when no qualifying segment touched the cell.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_data: bool,
}

/// GeoJSON MultiPolygon geometry. Coordinates are [longitude, latitude],
/// the export-time axis order viewers expect.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<Vec<[f64; 2]>>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    pub properties: CellProperties,
}

/// One field's heatmap: a GeoJSON FeatureCollection, one feature per cell.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub features: Vec<Feature>,
}

/// Per-field roll-up written into the run summary.
#[derive(Serialize, Debug, Clone)]
pub struct FieldSummary {
    pub name: String,
    pub cells: usize,
    pub total_yield: f64,
    pub max_density: f64,
}

/// Top-level summary of one run, persisted as summary.json.
#[derive(Serialize, Debug, Clone)]
pub struct RunSummary {
    pub ingest: IngestSummary,
    pub extraction: ExtractionSummary,
    pub fields: Vec<FieldSummary>,
}
