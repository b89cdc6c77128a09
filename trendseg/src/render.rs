use chrono::{DateTime, Utc};

use crate::bar::Bar;
use crate::segment::Segment;

/// Input contract for the rendering collaborator. The produced artifact is
/// opaque to the engine.
#[derive(Debug, Clone)]
pub struct RenderInput<'a> {
    pub points_data: &'a [Bar],
    pub min_price: f64,
    pub max_price: f64,
    pub average_price: f64,
    pub x0: DateTime<Utc>,
    pub pattern_point: Option<DateTime<Utc>>,
}

pub trait SegmentRenderer {
    type Artifact;

    fn render(&self, input: &RenderInput<'_>) -> Self::Artifact;
}

impl Segment {
    /// Builds the rendering input from this segment and the bars of its
    /// source series.
    pub fn render_input<'a>(&self, series_bars: &'a [Bar]) -> RenderInput<'a> {
        let end = (self.end_index + 1).min(series_bars.len());
        let start = self.start_index.min(end);
        RenderInput {
            points_data: &series_bars[start..end],
            min_price: self.min_price,
            max_price: self.max_price,
            average_price: self.average_price,
            x0: self.x0,
            pattern_point: self.pattern_point,
        }
    }
}
