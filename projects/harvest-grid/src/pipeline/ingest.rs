use crate::pipeline::types::{Field, Sample};
use anyhow::{Context, Result};
use geo::Intersects;
use geo_types::point;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Accounting of what the CSV reader kept and dropped.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IngestSummary {
    pub kept: usize,
    pub bad_coordinates: usize,
    pub outside_fields: usize,
}

/// Read the raw sample trace from a CSV file.
///
/// Keeps record order. Records with missing or unparsable coordinates are
/// dropped and counted; records whose point falls outside every configured
/// field boundary are dropped too (the trace is merged across runs and
/// contains transit between fields). The weight column is kept raw; the
/// segment extractor scrubs it later.
pub fn read_samples(csv_path: &Path, fields: &[Field]) -> Result<(Vec<Sample>, IngestSummary)> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open sample CSV at: {:?}", csv_path))?;
    samples_from_reader(reader, fields)
}

fn samples_from_reader<R: Read>(
    mut reader: csv::Reader<R>,
    fields: &[Field],
) -> Result<(Vec<Sample>, IngestSummary)> {
    let headers = reader.headers().context("Sample CSV has no header row")?;
    let lat_idx = find_column(headers, &["lat", "latitude"])
        .context("Sample CSV has no latitude column")?;
    let long_idx = find_column(headers, &["long", "lon", "lng", "longitude"])
        .context("Sample CSV has no longitude column")?;
    let weight_idx =
        find_column(headers, &["weight"]).context("Sample CSV has no weight column")?;

    let mut samples = Vec::new();
    let mut summary = IngestSummary::default();

    for record in reader.records() {
        let record = record.context("Failed to read CSV record")?;
        let coords = record
            .get(lat_idx)
            .and_then(|s| s.parse::<f64>().ok())
            .zip(record.get(long_idx).and_then(|s| s.parse::<f64>().ok()));
        let (lat, long) = match coords {
            Some((lat, long)) if lat.is_finite() && long.is_finite() => (lat, long),
            _ => {
                tracing::debug!(?record, "dropping record with bad coordinates");
                summary.bad_coordinates += 1;
                continue;
            }
        };

        let position = point! { x: lat, y: long };
        if !fields.iter().any(|f| f.boundary.intersects(&position)) {
            summary.outside_fields += 1;
            continue;
        }

        let raw_weight = record.get(weight_idx).unwrap_or("").to_string();
        samples.push(Sample::new(lat, long, raw_weight));
        summary.kept += 1;
    }

    Ok((samples, summary))
}

/// Case-insensitive header lookup across the accepted spellings.
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Polygon};

    fn unit_field() -> Field {
        Field {
            name: "field_1".to_string(),
            boundary: Polygon::new(
                LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
                vec![],
            ),
        }
    }

    fn read(csv_text: &str, fields: &[Field]) -> Result<(Vec<Sample>, IngestSummary)> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(csv_text.as_bytes());
        samples_from_reader(reader, fields)
    }

    #[test]
    fn test_reads_samples_in_order() {
        let csv_text = "lat,long,weight\n0.1,0.1,10\n0.1,0.2, 15 kg\n";
        let (samples, summary) = read(csv_text, &[unit_field()]).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(summary.kept, 2);
        assert_eq!(samples[0].lat, 0.1);
        assert_eq!(samples[1].raw_weight, "15 kg");
    }

    #[test]
    fn test_header_spellings_are_flexible() {
        let csv_text = "Latitude,LNG,Weight\n0.5,0.5,7\n";
        let (samples, _) = read(csv_text, &[unit_field()]).unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_bad_coordinates_are_dropped_and_counted() {
        let csv_text = "lat,long,weight\nnope,0.1,10\n0.2,,11\n0.3,0.3,12\n";
        let (samples, summary) = read(csv_text, &[unit_field()]).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(summary.bad_coordinates, 2);
    }

    #[test]
    fn test_points_outside_every_field_are_dropped() {
        let csv_text = "lat,long,weight\n0.5,0.5,10\n5.0,5.0,11\n";
        let (samples, summary) = read(csv_text, &[unit_field()]).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(summary.outside_fields, 1);
    }

    #[test]
    fn test_missing_weight_column_is_structural() {
        let csv_text = "lat,long,mass\n0.5,0.5,10\n";
        assert!(read(csv_text, &[unit_field()]).is_err());
    }
}
