//! Region statistics.
//!
//! Trimming is deterministic: the trim reference is the raw-region close
//! mean, so the predicate never depends on its own output. Final statistics
//! are recomputed over the trimmed slice, which is what guarantees
//! `min_price <= average_price <= max_price`.

use crate::bar::Bar;
use crate::config::EngineConfig;
use crate::constant::TrendDirection;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    pub min_price: f64,
    pub max_price: f64,
    pub average_price: f64,
    pub original_point_count: usize,
    pub point_count: usize,
    pub points_in_region: usize,
    pub red_point_count: usize,
    pub green_point_count: usize,
    /// Leading bars removed by trimming, relative to the raw region start.
    pub trim_offset: usize,
}

impl RegionStats {
    fn empty() -> Self {
        Self {
            min_price: 0.0,
            max_price: 0.0,
            average_price: 0.0,
            original_point_count: 0,
            point_count: 0,
            points_in_region: 0,
            red_point_count: 0,
            green_point_count: 0,
            trim_offset: 0,
        }
    }
}

/// Computes statistics for one raw region slice. An empty slice yields the
/// all-zero record rather than a division by zero.
pub fn compute(
    bars: &[Bar],
    direction: TrendDirection,
    config: &EngineConfig,
) -> RegionStats {
    if bars.is_empty() {
        return RegionStats::empty();
    }

    let original_point_count = bars.len();
    let trim_reference = mean_close(bars);
    let (lead, trail) = trim_bounds(bars, direction, trim_reference, config.trim_tolerance);
    let trimmed = &bars[lead..bars.len() - trail];

    let average_price = mean_close(trimmed);
    let min_price = trimmed
        .iter()
        .map(|b| b.low_price)
        .fold(f64::INFINITY, f64::min);
    let max_price = trimmed
        .iter()
        .map(|b| b.high_price)
        .fold(f64::NEG_INFINITY, f64::max);

    let points_in_region = trimmed
        .iter()
        .filter(|b| in_region(b, direction, average_price))
        .count();
    let red_point_count = trimmed.iter().filter(|b| b.is_red()).count();
    let green_point_count = trimmed.iter().filter(|b| b.is_green()).count();

    RegionStats {
        min_price,
        max_price,
        average_price,
        original_point_count,
        point_count: trimmed.len(),
        points_in_region,
        red_point_count,
        green_point_count,
        trim_offset: lead,
    }
}

/// In-region predicate: close on the directional side of the average.
pub fn in_region(bar: &Bar, direction: TrendDirection, average_price: f64) -> bool {
    match direction {
        TrendDirection::Up => bar.close_price >= average_price,
        TrendDirection::Down => bar.close_price <= average_price,
    }
}

/// Named fallback policy for `points_in_region` when the bar slice is not
/// available: ceiling of `fallback_ratio * point_count`, same ratio for both
/// directions (historical heuristic, see DESIGN.md).
pub fn fallback_points_in_region(point_count: usize, fallback_ratio: f64) -> usize {
    (point_count as f64 * fallback_ratio).ceil() as usize
}

// Counts leading and trailing bars whose close violates the directional
// predicate against the raw-region mean by more than the trim tolerance.
// Never trims the region below one bar.
fn trim_bounds(
    bars: &[Bar],
    direction: TrendDirection,
    reference: f64,
    trim_tolerance: f64,
) -> (usize, usize) {
    let violates = |bar: &Bar| -> bool {
        match direction {
            TrendDirection::Up => bar.close_price < reference * (1.0 - trim_tolerance),
            TrendDirection::Down => bar.close_price > reference * (1.0 + trim_tolerance),
        }
    };

    let mut lead = 0usize;
    let mut trail = 0usize;
    while lead + trail + 1 < bars.len() && violates(&bars[lead]) {
        lead += 1;
    }
    while lead + trail + 1 < bars.len() && violates(&bars[bars.len() - 1 - trail]) {
        trail += 1;
    }
    (lead, trail)
}

fn mean_close(bars: &[Bar]) -> f64 {
    if bars.is_empty() {
        return 0.0;
    }
    bars.iter().map(|b| b.close_price).sum::<f64>() / bars.len() as f64
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{compute, fallback_points_in_region};
    use crate::bar::Bar;
    use crate::config::EngineConfig;
    use crate::constant::TrendDirection;

    fn bar(minute: u32, open: f64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 9, minute, 0).unwrap(),
            open_price: open,
            high_price: open.max(close) + 1.0,
            low_price: open.min(close) - 1.0,
            close_price: close,
            volume: 10,
        }
    }

    #[test]
    fn invariants_hold_on_mixed_region() {
        let bars = vec![
            bar(0, 100.0, 101.0),
            bar(1, 101.0, 100.0),
            bar(2, 100.0, 103.0),
            bar(3, 103.0, 103.0),
            bar(4, 103.0, 105.0),
            bar(5, 105.0, 104.0),
        ];
        let stats = compute(&bars, TrendDirection::Up, &EngineConfig::default());

        assert!(stats.min_price <= stats.average_price);
        assert!(stats.average_price <= stats.max_price);
        assert!(stats.points_in_region <= stats.point_count);
        assert!(stats.point_count <= stats.original_point_count);
        assert!(stats.red_point_count + stats.green_point_count <= stats.point_count);
        // the retained slice is bars 2..=5: two green, one red, one flat bar
        // (close == open) that counts toward neither tally
        assert_eq!(stats.point_count, 4);
        assert_eq!(stats.green_point_count, 2);
        assert_eq!(stats.red_point_count, 1);
    }

    #[test]
    fn trimming_removes_edge_violators_only() {
        // Deep leading and trailing dips around an otherwise tight region.
        let bars = vec![
            bar(0, 90.0, 90.0),
            bar(1, 100.0, 100.0),
            bar(2, 100.0, 101.0),
            bar(3, 101.0, 100.5),
            bar(4, 100.5, 101.5),
            bar(5, 80.0, 80.0),
        ];
        let stats = compute(&bars, TrendDirection::Up, &EngineConfig::default());

        assert_eq!(stats.original_point_count, 6);
        assert_eq!(stats.trim_offset, 1);
        assert_eq!(stats.point_count, 4);
    }

    #[test]
    fn trimming_is_deterministic() {
        let bars: Vec<Bar> = (0..8).map(|i| bar(i, 100.0, 100.0 + i as f64)).collect();
        let config = EngineConfig::default();
        let a = compute(&bars, TrendDirection::Up, &config);
        let b = compute(&bars, TrendDirection::Up, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_region_is_guarded() {
        let stats = compute(&[], TrendDirection::Down, &EngineConfig::default());
        assert_eq!(stats.point_count, 0);
        assert_eq!(stats.points_in_region, 0);
    }

    #[test]
    fn fallback_is_ceiling_of_ratio() {
        assert_eq!(fallback_points_in_region(10, 0.6), 6);
        assert_eq!(fallback_points_in_region(7, 0.6), 5);
        assert_eq!(fallback_points_in_region(0, 0.6), 0);
    }
}
