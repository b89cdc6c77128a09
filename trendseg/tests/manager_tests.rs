use chrono::{NaiveDate, TimeZone, Utc};

use trendseg::{Bar, SchemaType, SegmentManager, SegmentationEngine, Series};

fn series(symbol: &str, closes: &[f64]) -> Series {
    let bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, c)| Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 9, i as u32, 0).unwrap(),
            open_price: *c,
            high_price: c + 0.3,
            low_price: c - 0.3,
            close_price: *c,
            volume: 10,
        })
        .collect();
    Series::new(symbol, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), bars)
        .expect("non-empty series")
}

fn unclassifiable_closes() -> Vec<f64> {
    // Gentle monotonic rise: in-region density stays below the R threshold
    // and the extremum sits at the slice edge rather than centrally, so the
    // segment lands in the unclassified pool.
    (0..10).map(|i| 100.0 + 0.1 * i as f64).collect()
}

#[test]
fn next_unclassified_follows_stable_order() {
    let engine = SegmentationEngine::default();
    let mut manager = SegmentManager::new();

    // Appended out of series order on purpose; the manager re-sorts.
    manager.append_batch(engine.segment_series(&series("bnp", &unclassifiable_closes())));
    manager.append_batch(engine.segment_series(&series("aca", &unclassifiable_closes())));

    let next = manager.next_unclassified().expect("one unclassified row");
    assert!(next.series_id.starts_with("ACA_"));
}

#[test]
fn override_is_explicit_and_sticky() {
    let engine = SegmentationEngine::default();
    let mut manager = SegmentManager::new();
    manager.append_batch(engine.segment_series(&series("aca", &unclassifiable_closes())));

    let id = manager.next_unclassified().expect("unclassified row").id.clone();
    assert!(manager.override_schema(&id, SchemaType::V));

    // Nothing left to review until an explicit reset.
    assert!(manager.next_unclassified().is_none());
    assert!(manager.reset_schema(&id));
    assert_eq!(manager.next_unclassified().expect("row is back").id, id);

    assert!(!manager.override_schema("missing_id", SchemaType::R));
}

#[test]
fn last_n_returns_the_tail_in_stable_order() {
    let engine = SegmentationEngine::default();
    let mut manager = SegmentManager::new();
    manager.append_batch(engine.segment_series(&series("bnp", &unclassifiable_closes())));
    manager.append_batch(engine.segment_series(&series("aca", &unclassifiable_closes())));
    manager.append_batch(engine.segment_series(&series("glx", &unclassifiable_closes())));

    let tail = manager.last_n(2);
    assert_eq!(tail.len(), 2);
    assert!(tail[0].series_id.starts_with("BNP_"));
    assert!(tail[1].series_id.starts_with("GLX_"));

    // Asking for more rows than exist returns everything.
    assert_eq!(manager.last_n(10).len(), manager.all_rows().len());
    assert!(manager.last_n(0).is_empty());
}

#[test]
fn dataframe_cache_tracks_rows() {
    let engine = SegmentationEngine::default();
    let mut manager = SegmentManager::new();
    manager.append_batch(engine.segment_series(&series("aca", &unclassifiable_closes())));

    let frame = manager.dataframe();
    assert_eq!(frame.height(), manager.all_rows().len());
    assert!(frame.get_column_names().contains(&"points_in_region"));
}

#[test]
fn parquet_snapshot_is_written() {
    let engine = SegmentationEngine::default();
    let mut manager = SegmentManager::new();
    manager.append_batch(engine.segment_series(&series("aca", &unclassifiable_closes())));

    let dir = std::env::temp_dir().join(format!(
        "trendseg_snapshot_{}_{}",
        std::process::id(),
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    manager
        .write_parquet_snapshot(&dir)
        .expect("snapshot should write");
    assert!(dir.join("segments.parquet").exists());

    let _ = std::fs::remove_dir_all(dir);
}
