use crate::pipeline::types::GridCell;
use geo::{Area, BooleanOps, BoundingRect};
use geo_types::{LineString, Polygon};

/// Default cell edge length, in coordinate units.
pub const DEFAULT_CELL_SIZE: f64 = 2e-4;

/// Tile a field boundary into fixed-size cells clipped to the boundary.
///
/// Cells are emitted column-major with rows top-to-bottom, so output order is
/// deterministic and easy to eyeball against a map. Order carries no meaning
/// for aggregation.
///
/// A degenerate (zero-area) boundary yields an empty list rather than an
/// error; the caller decides whether an empty grid is reportable.
pub fn build_grid(boundary: &Polygon<f64>, cell_w: f64, cell_h: f64) -> Vec<GridCell> {
    if !(cell_w > 0.0 && cell_h > 0.0) || boundary.unsigned_area() == 0.0 {
        return Vec::new();
    }
    let bbox = match boundary.bounding_rect() {
        Some(r) => r,
        None => return Vec::new(),
    };

    // Index-based stepping keeps the lattice free of accumulated float drift.
    // Row starts run one step past ymax so the top of the box is covered; the
    // surplus slivers at the bottom clip to zero area and are dropped below.
    let cols = ((bbox.max().x - bbox.min().x) / cell_w).ceil() as usize;
    let rows = ((bbox.max().y - bbox.min().y) / cell_h).ceil() as usize;

    let mut cells = Vec::new();
    for col in 0..cols {
        let x = bbox.min().x + col as f64 * cell_w;
        for row in (0..=rows).rev() {
            let y = bbox.min().y + row as f64 * cell_h;
            let rect = cell_rect(x, y, cell_w, cell_h);
            let clipped = boundary.intersection(&rect);
            let area = clipped.unsigned_area();
            if area > 0.0 {
                cells.push(GridCell {
                    shape: clipped,
                    area,
                });
            }
        }
    }
    cells
}

/// Nominal cell rectangle with its top edge at `y`, extending down by `h`.
fn cell_rect(x: f64, y: f64, w: f64, h: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![(x, y), (x + w, y), (x + w, y - h), (x, y - h)]),
        vec![],
    )
}
