use geo_types::{Line, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

/// A single recorded observation from the cart trace.
///
/// Coordinates are treated as planar (x = latitude, y = longitude) for all
/// geometry; the weight is kept raw because the scale column routinely
/// carries non-numeric noise that the extractor scrubs later.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub lat: f64,
    pub long: f64,
    pub raw_weight: String,
}

impl Sample {
    pub fn new(lat: f64, long: f64, raw_weight: impl Into<String>) -> Self {
        Self {
            lat,
            long,
            raw_weight: raw_weight.into(),
        }
    }
}

/// The line between two consecutive valid samples, carrying the yield picked
/// up per unit distance along it.
///
/// Density may be negative (unloading) or absurdly large (sensor noise) at
/// construction; the aggregator filters both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub line: Line<f64>,
    pub density: f64,
}

/// A configured harvested area of interest.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub boundary: Polygon<f64>,
}

/// One tile of a field's grid, clipped to the field boundary.
///
/// The clipped shape is authoritative: all intersection and area math
/// downstream uses it, never the nominal rectangle it was tiled from.
#[derive(Debug, Clone)]
pub struct GridCell {
    pub shape: MultiPolygon<f64>,
    pub area: f64,
}

/// An RGB display color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse a `#rrggbb` hex string (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

/// Display value assigned to a cell after normalization.
///
/// Cells that accumulated exactly zero yield get the sentinel variant rather
/// than the bottom of the color scale, so viewers can tell "no data" apart
/// from "low yield".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellColor {
    NoData,
    Mapped(Rgb),
}

/// Derived per-cell result for one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellYield {
    /// Accumulated raw yield in weight units.
    pub total: f64,
    /// Yield per unit area, over the clipped cell shape.
    pub density: f64,
    pub color: CellColor,
}

/// Why a consecutive sample pair produced no segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// One of the two weights failed to parse after scrubbing.
    WeightUnparsable,
    /// The two samples coincide; density would be undefined.
    ZeroDistance,
    /// Distance at or above the gap threshold: the cart jumped between
    /// unrelated harvest runs, not movement within a row.
    GapExceeded,
}

/// Observable accounting of what segment extraction kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub segments: usize,
    pub weight_unparsable: usize,
    pub zero_distance: usize,
    pub gap_exceeded: usize,
}

impl ExtractionSummary {
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::WeightUnparsable => self.weight_unparsable += 1,
            SkipReason::ZeroDistance => self.zero_distance += 1,
            SkipReason::GapExceeded => self.gap_exceeded += 1,
        }
    }

    pub fn total_skipped(&self) -> usize {
        self.weight_unparsable + self.zero_distance + self.gap_exceeded
    }
}
