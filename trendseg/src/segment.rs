use chrono::{DateTime, Utc};

use crate::constant::{SchemaType, TrendDirection};
use crate::stats::RegionStats;

/// The central derived record: one detected trend region with its
/// statistics, classification, and review/provenance fields. Immutable once
/// built; human feedback and ML tags are applied through the manager.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Stable identifier: series identity plus zero-padded ordinal.
    pub id: String,
    /// Back-reference to the owning series identity.
    pub series_id: String,
    pub direction: TrendDirection,
    /// Anchor timestamp: the first bar of the raw region.
    pub x0: DateTime<Utc>,
    pub min_price: f64,
    pub max_price: f64,
    pub average_price: f64,
    pub original_point_count: usize,
    pub point_count: usize,
    pub points_in_region: usize,
    pub red_point_count: usize,
    pub green_point_count: usize,
    pub schema: SchemaType,
    /// Optional salient timestamp within the segment; absent by default.
    pub pattern_point: Option<DateTime<Utc>>,
    /// Inclusive indices of the retained bar slice in the source series.
    pub start_index: usize,
    pub end_index: usize,
    pub is_result_correct: Option<bool>,
    pub result_interval: Option<String>,
    pub ml_model_name: Option<String>,
    pub ml_classed: Option<String>,
}

/// Pure assembly of the final record. The engine never writes the human
/// feedback or ML provenance fields.
pub struct SegmentBuilder<'a> {
    series_id: &'a str,
    ordinal: usize,
}

impl<'a> SegmentBuilder<'a> {
    pub fn new(series_id: &'a str) -> Self {
        Self {
            series_id,
            ordinal: 0,
        }
    }

    pub fn build(
        &mut self,
        direction: TrendDirection,
        x0: DateTime<Utc>,
        stats: &RegionStats,
        schema: SchemaType,
        start_index: usize,
        end_index: usize,
    ) -> Segment {
        let segment = Segment {
            id: format!("{}_{:03}", self.series_id, self.ordinal),
            series_id: self.series_id.to_string(),
            direction,
            x0,
            min_price: stats.min_price,
            max_price: stats.max_price,
            average_price: stats.average_price,
            original_point_count: stats.original_point_count,
            point_count: stats.point_count,
            points_in_region: stats.points_in_region,
            red_point_count: stats.red_point_count,
            green_point_count: stats.green_point_count,
            schema,
            pattern_point: None,
            start_index,
            end_index,
            is_result_correct: None,
            result_interval: None,
            ml_model_name: None,
            ml_classed: None,
        };
        self.ordinal += 1;
        segment
    }
}

/// Collapses the legacy textual sentinels for "no pattern point" to `None`.
/// The source data carried several equivalent forms; they are normalized
/// here, at the boundary, instead of propagating the ambiguity.
pub fn parse_pattern_point(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "null" | "none" | "unclassified" => None,
        _ => crate::normalizer::parse_datetime(trimmed).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_pattern_point;

    #[test]
    fn sentinel_forms_all_mean_absent() {
        for raw in ["", "  ", "null", "NULL", "None", "unclassified"] {
            assert_eq!(parse_pattern_point(raw), None);
        }
    }

    #[test]
    fn real_timestamp_is_kept() {
        let parsed = parse_pattern_point("2024-03-15 10:30:00");
        assert!(parsed.is_some());
    }

    #[test]
    fn garbage_degrades_to_absent() {
        assert_eq!(parse_pattern_point("not-a-date"), None);
    }
}
