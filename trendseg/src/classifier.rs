//! Schema classifier.
//!
//! Rule-based and total: every input maps to a schema, with `Unclassified`
//! as the safe default for insufficient data or when no rule matches. The
//! thresholds are documented decisions (DESIGN.md); the classifier never
//! errors.

use crate::bar::Bar;
use crate::config::EngineConfig;
use crate::constant::{SchemaType, TrendDirection};
use crate::stats::RegionStats;

const V_RATIO_THRESHOLD: f64 = 0.45;
const R_RATIO_THRESHOLD: f64 = 0.75;

/// Assigns a schema from a region's statistics and its retained bar slice.
pub fn classify(
    direction: TrendDirection,
    stats: &RegionStats,
    bars: &[Bar],
    config: &EngineConfig,
) -> SchemaType {
    if stats.point_count == 0 || stats.point_count < config.min_segment_len || bars.is_empty() {
        return SchemaType::Unclassified;
    }

    let ratio = stats.points_in_region as f64 / stats.point_count as f64;

    if ratio >= V_RATIO_THRESHOLD && pivot_is_central(direction, bars) {
        return SchemaType::V;
    }
    if ratio >= R_RATIO_THRESHOLD {
        return SchemaType::R;
    }
    SchemaType::Unclassified
}

// A V/Λ excursion: the price extremum falls in the middle third of the
// retained slice.
fn pivot_is_central(direction: TrendDirection, bars: &[Bar]) -> bool {
    let pivot = match direction {
        TrendDirection::Up => index_of_extreme(bars, |b| b.high_price, true),
        TrendDirection::Down => index_of_extreme(bars, |b| b.low_price, false),
    };
    let len = bars.len();
    pivot >= len / 3 && pivot <= (2 * len) / 3
}

fn index_of_extreme(bars: &[Bar], key: impl Fn(&Bar) -> f64, max: bool) -> usize {
    let mut best = 0usize;
    for (idx, bar) in bars.iter().enumerate().skip(1) {
        let better = if max {
            key(bar) > key(&bars[best])
        } else {
            key(bar) < key(&bars[best])
        };
        if better {
            best = idx;
        }
    }
    best
}
