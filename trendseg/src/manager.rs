//! Segment manager: review-side bookkeeping over produced segments.
//!
//! Holds rows in stable (series, x0) order, maintains a dataframe cache for
//! export, and owns the explicit human-override path. The engine's
//! classifier never re-runs here; schema changes go through
//! `override_schema`/`reset_schema` only.

use std::fs::{File, create_dir_all};
use std::path::Path;

use polars::df;
use polars::prelude::{DataFrame, ParquetWriter};

use crate::constant::{EngineError, SchemaType};
use crate::segment::Segment;

#[derive(Default)]
pub struct SegmentManager {
    rows: Vec<Segment>,
    df_cache: DataFrame,
}

impl SegmentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one series' worth of segments, keeping the overall stable
    /// ordering by (series id, x0).
    pub fn append_batch(&mut self, segments: Vec<Segment>) {
        self.rows.extend(segments);
        self.rows
            .sort_by(|a, b| a.series_id.cmp(&b.series_id).then(a.x0.cmp(&b.x0)));
        self.rebuild_cache();
    }

    pub fn all_rows(&self) -> &[Segment] {
        &self.rows
    }

    pub fn last_n(&self, n: usize) -> Vec<Segment> {
        self.rows
            .iter()
            .rev()
            .take(n)
            .cloned()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
    }

    /// The first unclassified segment in stable overall order, for the
    /// "next item to review" flow.
    pub fn next_unclassified(&self) -> Option<&Segment> {
        self.rows
            .iter()
            .find(|s| s.schema == SchemaType::Unclassified)
    }

    /// Applies a human override. Returns false when the id is unknown.
    pub fn override_schema(&mut self, id: &str, schema: SchemaType) -> bool {
        let Some(row) = self.rows.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        row.schema = schema;
        self.rebuild_cache();
        true
    }

    /// Explicitly returns a segment to the unclassified pool.
    pub fn reset_schema(&mut self, id: &str) -> bool {
        self.override_schema(id, SchemaType::Unclassified)
    }

    pub fn dataframe(&self) -> DataFrame {
        self.df_cache.clone()
    }

    pub fn write_parquet_snapshot(&self, output_dir: impl AsRef<Path>) -> Result<(), EngineError> {
        let output_dir = output_dir.as_ref();
        create_dir_all(output_dir)?;

        let mut file = File::create(output_dir.join("segments.parquet"))?;
        let mut frame = self.df_cache.clone();
        ParquetWriter::new(&mut file).finish(&mut frame)?;
        Ok(())
    }

    fn rebuild_cache(&mut self) {
        let ids: Vec<&str> = self.rows.iter().map(|x| x.id.as_str()).collect();
        let series_ids: Vec<&str> = self.rows.iter().map(|x| x.series_id.as_str()).collect();
        let directions: Vec<&str> = self.rows.iter().map(|x| x.direction.as_str()).collect();
        let x0: Vec<i64> = self.rows.iter().map(|x| x.x0.timestamp_millis()).collect();
        let min_price: Vec<f64> = self.rows.iter().map(|x| x.min_price).collect();
        let max_price: Vec<f64> = self.rows.iter().map(|x| x.max_price).collect();
        let average_price: Vec<f64> = self.rows.iter().map(|x| x.average_price).collect();
        let original_point_count: Vec<u32> = self
            .rows
            .iter()
            .map(|x| x.original_point_count as u32)
            .collect();
        let point_count: Vec<u32> = self.rows.iter().map(|x| x.point_count as u32).collect();
        let points_in_region: Vec<u32> = self
            .rows
            .iter()
            .map(|x| x.points_in_region as u32)
            .collect();
        let red_point_count: Vec<u32> = self
            .rows
            .iter()
            .map(|x| x.red_point_count as u32)
            .collect();
        let green_point_count: Vec<u32> = self
            .rows
            .iter()
            .map(|x| x.green_point_count as u32)
            .collect();
        let schema: Vec<&str> = self.rows.iter().map(|x| x.schema.as_str()).collect();
        let pattern_point: Vec<Option<i64>> = self
            .rows
            .iter()
            .map(|x| x.pattern_point.map(|p| p.timestamp_millis()))
            .collect();
        let ml_model_name: Vec<Option<&str>> = self
            .rows
            .iter()
            .map(|x| x.ml_model_name.as_deref())
            .collect();

        self.df_cache = df!(
            "id" => ids,
            "series_id" => series_ids,
            "direction" => directions,
            "x0" => x0,
            "min_price" => min_price,
            "max_price" => max_price,
            "average_price" => average_price,
            "original_point_count" => original_point_count,
            "point_count" => point_count,
            "points_in_region" => points_in_region,
            "red_point_count" => red_point_count,
            "green_point_count" => green_point_count,
            "schema" => schema,
            "pattern_point" => pattern_point,
            "ml_model_name" => ml_model_name
        )
        .expect("failed to rebuild segment dataframe cache");
    }
}
