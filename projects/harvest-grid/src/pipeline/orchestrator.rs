// Pipeline orchestrator: runs one aggregation pass end to end.
//
// Ingestion and segment extraction happen once; per-field grid building,
// aggregation, and colorizing fan out to one worker per field with read-only
// access to the shared segment set.

use crate::export;
use crate::pipeline::aggregate::aggregate_cells;
use crate::pipeline::colorize::{linear_ramp, normalize_and_colorize};
use crate::pipeline::grid::build_grid;
use crate::pipeline::ingest;
use crate::pipeline::segments::extract_segments;
use crate::pipeline::types::{CellYield, Field, GridCell, Segment};
use crate::run_artifacts::{FieldSummary, RunSummary};
use crate::run_context::{RunConfig, RunMetadata, Settings};
use anyhow::{Context, Result};
use std::fs;

/// One field's complete heatmap for a single run.
#[derive(Debug, Clone)]
pub struct FieldYieldmap {
    pub name: String,
    pub cells: Vec<GridCell>,
    pub yields: Vec<CellYield>,
}

/// Run the whole pipeline: ingest, extract, aggregate per field, export.
pub fn run(config: &RunConfig, settings: Settings, metadata: &RunMetadata) -> Result<RunSummary> {
    let fields = config.fields();

    let (samples, ingest_summary) = ingest::read_samples(&config.csv_filepath, &fields)?;
    tracing::info!(
        kept = ingest_summary.kept,
        bad_coordinates = ingest_summary.bad_coordinates,
        outside_fields = ingest_summary.outside_fields,
        "ingested sample trace"
    );

    let (segments, extraction) = extract_segments(&samples, settings.max_gap);
    tracing::info!(
        segments = extraction.segments,
        skipped = extraction.total_skipped(),
        weight_unparsable = extraction.weight_unparsable,
        zero_distance = extraction.zero_distance,
        gap_exceeded = extraction.gap_exceeded,
        "extracted yield segments"
    );

    let maps = aggregate_fields(&fields, &segments, settings)?;

    let mut field_summaries = Vec::with_capacity(maps.len());
    for map in &maps {
        let path = export::write_field_geojson(&metadata.output_dir, map)?;
        tracing::info!(field = %map.name, path = ?path, "wrote field heatmap");
        field_summaries.push(FieldSummary {
            name: map.name.clone(),
            cells: map.cells.len(),
            total_yield: map.yields.iter().map(|y| y.total).sum(),
            max_density: map.yields.iter().map(|y| y.density).fold(0.0, f64::max),
        });
    }

    let summary = RunSummary {
        ingest: ingest_summary,
        extraction,
        fields: field_summaries,
    };
    let summary_path = metadata.output_dir.join("summary.json");
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("Failed to write run summary at: {:?}", summary_path))?;

    Ok(summary)
}

/// Aggregate every field, one worker thread per field.
///
/// Results come back in field order regardless of which worker finishes
/// first, so output stays deterministic.
fn aggregate_fields(
    fields: &[Field],
    segments: &[Segment],
    settings: Settings,
) -> Result<Vec<FieldYieldmap>> {
    crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = fields
            .iter()
            .map(|field| scope.spawn(move |_| process_field(field, segments, settings)))
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!("field worker panicked")),
            })
            .collect::<Result<Vec<_>>>()
    })
    .map_err(|_| anyhow::anyhow!("field worker panicked"))?
}

/// Grid, aggregate, and colorize a single field against the shared segments.
fn process_field(field: &Field, segments: &[Segment], settings: Settings) -> Result<FieldYieldmap> {
    let cells = build_grid(&field.boundary, settings.cell_size, settings.cell_size);
    if cells.is_empty() {
        anyhow::bail!(
            "field '{}' produced no usable grid cells; check its boundary coordinates",
            field.name
        );
    }

    let totals = aggregate_cells(&cells, segments, settings.max_density);
    let ramp = linear_ramp(settings.ramp_low, settings.ramp_high);
    let yields = normalize_and_colorize(&cells, &totals, ramp);
    tracing::info!(field = %field.name, cells = cells.len(), "aggregated field");

    Ok(FieldYieldmap {
        name: field.name.clone(),
        cells,
        yields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::colorize::{DEFAULT_COLOR_HIGH, DEFAULT_COLOR_LOW};
    use crate::pipeline::types::{CellColor, Sample};
    use geo_types::{LineString, Polygon};

    fn test_settings() -> Settings {
        Settings {
            cell_size: 0.5,
            max_gap: 1.0,
            max_density: 4e6,
            ramp_low: DEFAULT_COLOR_LOW,
            ramp_high: DEFAULT_COLOR_HIGH,
        }
    }

    fn unit_field(name: &str) -> Field {
        Field {
            name: name.to_string(),
            boundary: Polygon::new(
                LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
                vec![],
            ),
        }
    }

    #[test]
    fn test_process_field_end_to_end() {
        let field = unit_field("field_1");
        let samples = vec![Sample::new(0.4, 0.1, "0"), Sample::new(0.6, 0.1, "100")];
        let (segments, _) = extract_segments(&samples, 1.0);

        let map = process_field(&field, &segments, test_settings()).unwrap();
        assert_eq!(map.cells.len(), 4);
        assert_eq!(map.yields.len(), 4);

        // Bottom cells of both columns each get 0.1 length at density 500.
        assert!((map.yields[1].total - 50.0).abs() < 1e-6);
        assert!((map.yields[3].total - 50.0).abs() < 1e-6);
        assert_eq!(map.yields[0].color, CellColor::NoData);
        assert!(matches!(map.yields[1].color, CellColor::Mapped(_)));
    }

    #[test]
    fn test_degenerate_field_is_a_reportable_failure() {
        let field = Field {
            name: "flat".to_string(),
            boundary: Polygon::new(
                LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
                vec![],
            ),
        };
        let err = process_field(&field, &[], test_settings()).unwrap_err();
        assert!(err.to_string().contains("flat"));
    }

    #[test]
    fn test_fields_aggregate_independently_from_shared_segments() {
        // Two disjoint fields; the segment lies in the first one only.
        let near = unit_field("near");
        let far = Field {
            name: "far".to_string(),
            boundary: Polygon::new(
                LineString::from(vec![(10.0, 10.0), (11.0, 10.0), (11.0, 11.0), (10.0, 11.0)]),
                vec![],
            ),
        };
        let samples = vec![Sample::new(0.4, 0.1, "0"), Sample::new(0.6, 0.1, "100")];
        let (segments, _) = extract_segments(&samples, 1.0);

        let maps = aggregate_fields(&[near, far], &segments, test_settings()).unwrap();
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0].name, "near");
        assert_eq!(maps[1].name, "far");
        assert!(maps[0].yields.iter().map(|y| y.total).sum::<f64>() > 0.0);
        assert_eq!(maps[1].yields.iter().map(|y| y.total).sum::<f64>(), 0.0);
    }

    #[test]
    fn test_determinism_across_runs() {
        let field = unit_field("field_1");
        let samples = vec![
            Sample::new(0.1, 0.1, "0"),
            Sample::new(0.4, 0.2, "30"),
            Sample::new(0.6, 0.7, "55"),
            Sample::new(0.9, 0.9, "80"),
        ];
        let (segments, _) = extract_segments(&samples, 10.0);

        let a = process_field(&field, &segments, test_settings()).unwrap();
        let b = process_field(&field, &segments, test_settings()).unwrap();
        assert_eq!(a.yields, b.yields);
    }
}
