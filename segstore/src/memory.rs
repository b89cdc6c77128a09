use std::collections::BTreeMap;

use trendseg::{Segment, SegmentStore};

/// In-process store with the same replace-on-conflict semantics as the file
/// store. Useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySegmentStore {
    rows: BTreeMap<String, Segment>,
}

impl MemorySegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn all_rows(&self) -> Vec<Segment> {
        self.rows.values().cloned().collect()
    }
}

impl SegmentStore for MemorySegmentStore {
    fn save_segments(&mut self, segments: &[Segment], series_id: &str) -> std::io::Result<()> {
        self.rows.retain(|_, segment| segment.series_id != series_id);
        for segment in segments {
            self.rows.insert(segment.id.clone(), segment.clone());
        }
        Ok(())
    }

    fn segments_exist_for(&self, symbol: &str) -> std::io::Result<bool> {
        let prefix = format!("{}_", symbol.trim().to_uppercase());
        Ok(self
            .rows
            .values()
            .any(|segment| segment.series_id.starts_with(&prefix)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::MemorySegmentStore;
    use trendseg::{SchemaType, Segment, SegmentStore, TrendDirection};

    fn segment(ordinal: usize) -> Segment {
        Segment {
            id: format!("ACA_2024-03-15_{ordinal:03}"),
            series_id: "ACA_2024-03-15".to_string(),
            direction: TrendDirection::Down,
            x0: Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            min_price: 9.0,
            max_price: 10.0,
            average_price: 9.4,
            original_point_count: 6,
            point_count: 6,
            points_in_region: 4,
            red_point_count: 4,
            green_point_count: 1,
            schema: SchemaType::V,
            pattern_point: None,
            start_index: 0,
            end_index: 5,
            is_result_correct: None,
            result_interval: None,
            ml_model_name: None,
            ml_classed: None,
        }
    }

    #[test]
    fn replace_on_conflict_matches_file_store() {
        let mut store = MemorySegmentStore::new();
        store
            .save_segments(&[segment(0), segment(1)], "ACA_2024-03-15")
            .expect("save");
        store
            .save_segments(&[segment(0)], "ACA_2024-03-15")
            .expect("save");

        assert_eq!(store.len(), 1);
        assert!(store.segments_exist_for("ACA").expect("lookup"));
    }
}
