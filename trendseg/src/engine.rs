//! Engine facade: the single-pass pipeline over one series, plus the
//! caller-side ingestion policy against a storage collaborator.

use tracing::{debug, info};

use crate::classifier;
use crate::config::EngineConfig;
use crate::segment::{Segment, SegmentBuilder};
use crate::segmenter;
use crate::series::Series;
use crate::stats;

/// Storage collaborator seam. `save_segments` is an all-or-nothing batch
/// with replace-on-conflict semantics keyed by segment id, so re-runs are
/// idempotent; `segments_exist_for` lets the caller skip re-segmenting an
/// already-processed series.
pub trait SegmentStore {
    fn save_segments(&mut self, segments: &[Segment], series_id: &str) -> std::io::Result<()>;

    fn segments_exist_for(&self, symbol: &str) -> std::io::Result<bool>;
}

/// Outcome of one ingestion run. Zero detected segments is a valid terminal
/// outcome, reported distinctly from failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The store already holds segments for this symbol; the engine was not
    /// re-invoked by policy.
    AlreadySegmented,
    /// The series was too short or too noisy for even one segment.
    NoSegments,
    /// This many segments were written.
    Stored(usize),
}

pub struct SegmentationEngine {
    config: EngineConfig,
}

impl Default for SegmentationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SegmentationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pure pipeline over one series: segmenter → statistics → classifier →
    /// record builder. Segments come out ordered by `x0`, non-overlapping by
    /// construction. Holds no state across invocations.
    pub fn segment_series(&self, series: &Series) -> Vec<Segment> {
        let bars = series.bars();
        let series_id = series.identity();
        let regions = segmenter::scan_regions(bars, &self.config);

        let mut builder = SegmentBuilder::new(&series_id);
        let mut segments = Vec::with_capacity(regions.len());
        for region in regions {
            let slice = &bars[region.start..=region.end];
            let region_stats = stats::compute(slice, region.direction, &self.config);

            let start_index = region.start + region_stats.trim_offset;
            let end_index = start_index + region_stats.point_count.saturating_sub(1);
            let retained = &bars[start_index..=end_index];

            let schema =
                classifier::classify(region.direction, &region_stats, retained, &self.config);
            let x0 = bars[region.start].timestamp;

            debug!(
                direction = region.direction.as_str(),
                original = region_stats.original_point_count,
                retained = region_stats.point_count,
                schema = schema.as_str(),
                "segment built"
            );
            segments.push(builder.build(
                region.direction,
                x0,
                &region_stats,
                schema,
                start_index,
                end_index,
            ));
        }

        info!(
            series = %series_id,
            points = series.total_points(),
            segments = segments.len(),
            "series segmented"
        );
        segments
    }

    /// One ingestion call end-to-end against a storage collaborator. Skips
    /// already-segmented symbols; otherwise segments, persists, and reports
    /// the outcome.
    pub fn run(
        &self,
        series: &Series,
        store: &mut dyn SegmentStore,
    ) -> std::io::Result<IngestOutcome> {
        if store.segments_exist_for(series.symbol())? {
            info!(symbol = series.symbol(), "segments already exist, skipping");
            return Ok(IngestOutcome::AlreadySegmented);
        }

        let segments = self.segment_series(series);
        if segments.is_empty() {
            return Ok(IngestOutcome::NoSegments);
        }

        store.save_segments(&segments, &series.identity())?;
        Ok(IngestOutcome::Stored(segments.len()))
    }
}
