use crate::pipeline::orchestrator::FieldYieldmap;
use crate::pipeline::types::CellColor;
use crate::run_artifacts::{CellProperties, Feature, FeatureCollection, Geometry};
use anyhow::{Context, Result};
use geo_types::MultiPolygon;
use std::fs;
use std::path::{Path, PathBuf};

/// Convert one field's results into a GeoJSON FeatureCollection.
///
/// The pipeline works in (x = latitude, y = longitude); GeoJSON wants
/// [longitude, latitude], so axes are swapped here and only here.
pub fn feature_collection(map: &FieldYieldmap) -> FeatureCollection {
    let features = map
        .cells
        .iter()
        .zip(&map.yields)
        .map(|(cell, cell_yield)| {
            let (fill, no_data) = match cell_yield.color {
                CellColor::NoData => (None, true),
                CellColor::Mapped(rgb) => (Some(rgb.to_hex()), false),
            };
            Feature {
                kind: "Feature".to_string(),
                geometry: geometry(&cell.shape),
                properties: CellProperties {
                    yield_weight: cell_yield.total,
                    density: cell_yield.density,
                    fill,
                    no_data,
                },
            }
        })
        .collect();

    FeatureCollection {
        kind: "FeatureCollection".to_string(),
        name: map.name.clone(),
        features,
    }
}

fn geometry(shape: &MultiPolygon<f64>) -> Geometry {
    let coordinates = shape
        .0
        .iter()
        .map(|polygon| {
            std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .map(|ring| ring.coords().map(|c| [c.y, c.x]).collect())
                .collect()
        })
        .collect();
    Geometry {
        kind: "MultiPolygon".to_string(),
        coordinates,
    }
}

/// Write one field's heatmap as `<field>.geojson` in the run directory.
pub fn write_field_geojson(output_dir: &Path, map: &FieldYieldmap) -> Result<PathBuf> {
    let collection = feature_collection(map);
    let path = output_dir.join(format!("{}.geojson", map.name));
    let json = serde_json::to_string_pretty(&collection)?;
    fs::write(&path, json).with_context(|| format!("Failed to write GeoJSON at: {:?}", path))?;
    Ok(path)
}
