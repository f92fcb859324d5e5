use itertools::{Itertools, MinMaxResult};

use crate::time_series::SamplePoint;

/// Fraction of the flux range added above and below the data
const FLUX_PADDING: f64 = 0.05;

/// X bounds for the light-curve chart: sample indices from 0 to the last one
pub fn index_bounds(series: &[SamplePoint]) -> [f64; 2] {
    let last = series.len().saturating_sub(1).max(1);
    [0.0, last as f64]
}

/// Integer tick values that land exactly on the evenly spaced axis labels
pub fn index_ticks(series: &[SamplePoint]) -> Vec<usize> {
    let last = series.len().saturating_sub(1).max(1);
    if last % 2 == 0 {
        vec![0, last / 2, last]
    } else {
        vec![0, last]
    }
}

/// Y bounds scaled to the data, padded so the line never sits on the frame
pub fn flux_bounds(series: &[SamplePoint]) -> [f64; 2] {
    match series.iter().map(|p| p.flux).minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::NoElements => [0.0, 1.0],
        MinMaxResult::OneElement(v) => flat_bounds(v),
        MinMaxResult::MinMax(lo, hi) if lo == hi => flat_bounds(lo),
        MinMaxResult::MinMax(lo, hi) => {
            let range = hi - lo;
            let pad = if range.is_finite() {
                range * FLUX_PADDING
            } else {
                hi * FLUX_PADDING - lo * FLUX_PADDING
            };
            clamp_finite(lo - pad, hi + pad)
        }
    }
}

fn flat_bounds(v: f64) -> [f64; 2] {
    let pad = if v == 0.0 { 1.0 } else { v.abs() * FLUX_PADDING };
    clamp_finite(v - pad, v + pad)
}

// Padding can push values near the f64 limits past them
fn clamp_finite(lo: f64, hi: f64) -> [f64; 2] {
    [lo.max(f64::MIN), hi.min(f64::MAX)]
}

/// Low, middle and high labels for the flux axis
pub fn flux_labels(bounds: [f64; 2]) -> Vec<String> {
    let mid = bounds[0] / 2.0 + bounds[1] / 2.0;
    [bounds[0], mid, bounds[1]]
        .into_iter()
        .map(format_label)
        .collect()
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
