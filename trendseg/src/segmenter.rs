//! Trend segmenter.
//!
//! Walks the bar sequence left to right and emits maximal raw regions whose
//! closes stay on one side of a rolling reference price (the running mean of
//! closes inside the open region) within a relative tolerance. Regions
//! shorter than `min_segment_len` are discarded; the next scan always
//! resumes immediately after the last bar of the previous region, so regions
//! never overlap.

use tracing::debug;

use crate::bar::Bar;
use crate::config::EngineConfig;
use crate::constant::TrendDirection;

/// A candidate region before statistics and trimming. Indices are inclusive
/// positions into the source bar slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRegion {
    pub direction: TrendDirection,
    pub start: usize,
    pub end: usize,
}

impl RawRegion {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Scans the full sequence. A series shorter than the minimum segment length
/// yields zero regions, which is a valid terminal outcome rather than an
/// error.
pub fn scan_regions(bars: &[Bar], config: &EngineConfig) -> Vec<RawRegion> {
    let min_len = config.min_segment_len.max(2);
    let mut regions = Vec::new();

    let mut cursor = 0usize;
    while cursor + 1 < bars.len() {
        let (region, next) = open_region(bars, cursor, config);
        if region.len() >= min_len {
            regions.push(region);
        }
        cursor = next;
    }

    debug!(
        bars = bars.len(),
        regions = regions.len(),
        "segmenter scan complete"
    );
    regions
}

// Opens a region at `start` and extends it while the directional predicate
// holds against the rolling reference. Returns the closed region and the
// next scan position. Flat openings break toward Up.
fn open_region(bars: &[Bar], start: usize, config: &EngineConfig) -> (RawRegion, usize) {
    let anchor = bars[start].close_price;
    let second = bars[start + 1].close_price;
    let opening_tolerance = anchor.abs() * config.reference_tolerance;

    let direction = if second >= anchor - opening_tolerance {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };

    let mut close_sum = anchor + second;
    let mut count = 2usize;
    let mut end = start + 1;

    for (offset, bar) in bars.iter().enumerate().skip(start + 2) {
        let reference = close_sum / count as f64;
        let tolerance = reference.abs() * config.reference_tolerance;
        let holds = match direction {
            TrendDirection::Up => bar.close_price >= reference - tolerance,
            TrendDirection::Down => bar.close_price <= reference + tolerance,
        };
        if !holds {
            break;
        }
        close_sum += bar.close_price;
        count += 1;
        end = offset;
    }

    (
        RawRegion {
            direction,
            start,
            end,
        },
        end + 1,
    )
}
