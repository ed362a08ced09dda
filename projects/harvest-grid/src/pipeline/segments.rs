use crate::pipeline::types::{ExtractionSummary, Sample, Segment, SkipReason};
use geo_types::{coord, Line};

/// Maximum distance between consecutive samples that still counts as
/// within-harvest movement, in coordinate units. At or beyond this the cart
/// jumped to an unrelated row or field and the pair is dropped.
pub const DEFAULT_MAX_GAP: f64 = 1e-4;

/// Recover the numeric payload from a raw weight reading.
///
/// Keeps letters, digits, and the decimal point; strips everything else
/// (whitespace, control bytes, punctuation from the logger). A value that
/// still fails to parse after scrubbing is reported as unparsable.
fn parse_weight(raw: &str) -> Option<f64> {
    let scrubbed: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.')
        .collect();
    scrubbed.parse::<f64>().ok().filter(|w| w.is_finite())
}

/// Convert a cleaned sample sequence into weighted line segments.
///
/// Each consecutive pair that passes the distance and weight checks becomes
/// one segment with density = Δweight / distance. Every rejected pair is
/// counted in the summary by reason; a bad pair never affects its neighbors.
pub fn extract_segments(samples: &[Sample], max_gap: f64) -> (Vec<Segment>, ExtractionSummary) {
    let mut segments = Vec::new();
    let mut summary = ExtractionSummary::default();

    for pair in samples.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        match segment_from_pair(a, b, max_gap) {
            Ok(segment) => {
                segments.push(segment);
                summary.segments += 1;
            }
            Err(reason) => {
                tracing::debug!(?reason, "skipping sample pair");
                summary.record_skip(reason);
            }
        }
    }

    (segments, summary)
}

fn segment_from_pair(a: &Sample, b: &Sample, max_gap: f64) -> Result<Segment, SkipReason> {
    let (weight_a, weight_b) = match (parse_weight(&a.raw_weight), parse_weight(&b.raw_weight)) {
        (Some(wa), Some(wb)) => (wa, wb),
        _ => return Err(SkipReason::WeightUnparsable),
    };

    let distance = f64::hypot(b.lat - a.lat, b.long - a.long);
    if distance == 0.0 {
        return Err(SkipReason::ZeroDistance);
    }
    if distance >= max_gap {
        return Err(SkipReason::GapExceeded);
    }

    Ok(Segment {
        line: Line::new(
            coord! { x: a.lat, y: a.long },
            coord! { x: b.lat, y: b.long },
        ),
        density: (weight_b - weight_a) / distance,
    })
}
