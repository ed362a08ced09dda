use crate::pipeline::types::{GridCell, Segment};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Contains, EuclideanLength, Intersects};
use geo_types::{Coord, Line, MultiPolygon, Point};

/// Densities above this are sensor artifacts, in weight units per
/// coordinate unit of travel. Negative densities are rejected outright.
pub const DEFAULT_MAX_DENSITY: f64 = 4e6;

/// Coincidence tolerance when deduping boundary crossings. Crossings through
/// a cell corner are reported once per touching edge at (near) identical
/// coordinates; they must collapse to a single point.
const CROSSING_EPS: f64 = 1e-12;

/// Accumulate attributable yield per cell over the full segment set.
///
/// Output order matches the input cell order. A cell no qualifying segment
/// touches stays at zero; degenerate geometry contributes zero rather than
/// aborting the run.
pub fn aggregate_cells(cells: &[GridCell], segments: &[Segment], max_density: f64) -> Vec<f64> {
    cells
        .iter()
        .map(|cell| {
            segments
                .iter()
                .map(|segment| cell_contribution(cell, segment, max_density))
                .sum()
        })
        .collect()
}

/// Yield one segment contributes to one cell: attributable length × density.
fn cell_contribution(cell: &GridCell, segment: &Segment, max_density: f64) -> f64 {
    // Out-of-range density is a measurement artifact, not real yield.
    if segment.density < 0.0 || segment.density > max_density || !segment.density.is_finite() {
        return 0.0;
    }
    let line = segment.line;
    if !coords_finite(&line) || !line.intersects(&cell.shape) {
        return 0.0;
    }

    let crossings = match boundary_crossings(&cell.shape, &line) {
        Some(points) => points,
        // Collinear/tangential overlap with an edge: no attribution.
        None => return 0.0,
    };

    let length = match crossings.as_slice() {
        // Segment crosses the cell: entered at one point, left at the other.
        [a, b] => Line::new(*a, *b).euclidean_length(),
        // One endpoint inside the cell, the other outside.
        [p] => match interior_endpoint(&cell.shape, &line) {
            Some(endpoint) => Line::new(endpoint, *p).euclidean_length(),
            None => 0.0,
        },
        // Fully interior, corner touch, or empty: nothing attributable.
        _ => 0.0,
    };

    if length.is_finite() {
        length * segment.density
    } else {
        0.0
    }
}

/// Distinct points where the segment crosses the cell's perimeter.
///
/// Returns `None` when the segment runs collinear along an edge, which the
/// attribution rule treats as tangential.
fn boundary_crossings(shape: &MultiPolygon<f64>, line: &Line<f64>) -> Option<Vec<Coord<f64>>> {
    let mut points: Vec<Coord<f64>> = Vec::new();
    for polygon in &shape.0 {
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
        for ring in rings {
            for edge in ring.lines() {
                match line_intersection(*line, edge) {
                    Some(LineIntersection::SinglePoint { intersection, .. }) => {
                        if !points
                            .iter()
                            .any(|p| (p.x - intersection.x).abs() <= CROSSING_EPS
                                && (p.y - intersection.y).abs() <= CROSSING_EPS)
                        {
                            points.push(intersection);
                        }
                    }
                    Some(LineIntersection::Collinear { .. }) => return None,
                    None => {}
                }
            }
        }
    }
    Some(points)
}

/// Whichever of the segment's endpoints lies strictly inside the cell.
fn interior_endpoint(shape: &MultiPolygon<f64>, line: &Line<f64>) -> Option<Coord<f64>> {
    if shape.contains(&Point::from(line.start)) {
        Some(line.start)
    } else if shape.contains(&Point::from(line.end)) {
        Some(line.end)
    } else {
        None
    }
}

fn coords_finite(line: &Line<f64>) -> bool {
    line.start.x.is_finite()
        && line.start.y.is_finite()
        && line.end.x.is_finite()
        && line.end.y.is_finite()
}
