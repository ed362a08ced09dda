use crate::pipeline::types::{CellColor, CellYield, GridCell, Rgb};

/// Bottom of the default yield color scale (pale yellow).
pub const DEFAULT_COLOR_LOW: Rgb = Rgb {
    r: 0xff,
    g: 0xff,
    b: 0xb2,
};

/// Top of the default yield color scale (deep red).
pub const DEFAULT_COLOR_HIGH: Rgb = Rgb {
    r: 0xbd,
    g: 0x00,
    b: 0x26,
};

/// Normalize per-cell yields by clipped cell area and assign display colors.
///
/// `color_fn` maps the unit interval to a color; any monotonic, deterministic
/// mapping works. Cells with exactly zero accumulated yield always get the
/// no-data sentinel, never a scale color. When no cell has positive density
/// the normalization max is taken as 1 so the division stays defined.
pub fn normalize_and_colorize<F>(cells: &[GridCell], yields: &[f64], color_fn: F) -> Vec<CellYield>
where
    F: Fn(f64) -> Rgb,
{
    debug_assert_eq!(cells.len(), yields.len());

    let densities: Vec<f64> = cells
        .iter()
        .zip(yields)
        .map(|(cell, total)| if cell.area > 0.0 { total / cell.area } else { 0.0 })
        .collect();

    let max_density = densities.iter().cloned().fold(0.0, f64::max);
    let max_density = if max_density > 0.0 { max_density } else { 1.0 };

    yields
        .iter()
        .zip(&densities)
        .map(|(&total, &density)| {
            let color = if total == 0.0 {
                CellColor::NoData
            } else {
                CellColor::Mapped(color_fn(density / max_density))
            };
            CellYield {
                total,
                density,
                color,
            }
        })
        .collect()
}

/// Linear interpolation between two color endpoints over [0, 1].
pub fn linear_ramp(low: Rgb, high: Rgb) -> impl Fn(f64) -> Rgb {
    move |t: f64| {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb {
            r: lerp(low.r, high.r),
            g: lerp(low.g, high.g),
            b: lerp(low.b, high.b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, MultiPolygon, Polygon};

    fn square_cell(size: f64) -> GridCell {
        let poly = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (size, 0.0), (size, size), (0.0, size)]),
            vec![],
        );
        GridCell {
            shape: MultiPolygon(vec![poly]),
            area: size * size,
        }
    }

    #[test]
    fn test_zero_yield_gets_no_data_sentinel() {
        let cells = vec![square_cell(0.5), square_cell(0.5)];
        let out = normalize_and_colorize(&cells, &[0.0, 10.0], linear_ramp(
            DEFAULT_COLOR_LOW,
            DEFAULT_COLOR_HIGH,
        ));
        assert_eq!(out[0].color, CellColor::NoData);
        assert!(matches!(out[1].color, CellColor::Mapped(_)));
    }

    #[test]
    fn test_density_is_yield_over_clipped_area() {
        let cells = vec![square_cell(0.5)];
        let out = normalize_and_colorize(&cells, &[10.0], |_| DEFAULT_COLOR_HIGH);
        assert!((out[0].density - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_cell_gets_top_of_scale() {
        let cells = vec![square_cell(0.5), square_cell(0.5)];
        let ramp = linear_ramp(DEFAULT_COLOR_LOW, DEFAULT_COLOR_HIGH);
        let out = normalize_and_colorize(&cells, &[5.0, 10.0], ramp);
        assert_eq!(out[1].color, CellColor::Mapped(DEFAULT_COLOR_HIGH));
    }

    #[test]
    fn test_all_zero_yields_do_not_divide_by_zero() {
        let cells = vec![square_cell(0.5), square_cell(0.5)];
        let out = normalize_and_colorize(&cells, &[0.0, 0.0], linear_ramp(
            DEFAULT_COLOR_LOW,
            DEFAULT_COLOR_HIGH,
        ));
        assert!(out.iter().all(|c| c.color == CellColor::NoData));
        assert!(out.iter().all(|c| c.density == 0.0));
    }

    #[test]
    fn test_empty_field_is_fine() {
        let out = normalize_and_colorize(&[], &[], |_| DEFAULT_COLOR_LOW);
        assert!(out.is_empty());
    }

    #[test]
    fn test_linear_ramp_endpoints_and_midpoint() {
        let ramp = linear_ramp(Rgb { r: 0, g: 0, b: 0 }, Rgb { r: 200, g: 100, b: 50 });
        assert_eq!(ramp(0.0), Rgb { r: 0, g: 0, b: 0 });
        assert_eq!(ramp(1.0), Rgb { r: 200, g: 100, b: 50 });
        assert_eq!(ramp(0.5), Rgb { r: 100, g: 50, b: 25 });
        // Out-of-range inputs clamp instead of extrapolating.
        assert_eq!(ramp(2.0), Rgb { r: 200, g: 100, b: 50 });
        assert_eq!(ramp(-1.0), Rgb { r: 0, g: 0, b: 0 });
    }
}
