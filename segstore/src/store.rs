use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use trendseg::{Segment, SegmentStore};

use crate::record::{decode_segment, encode_segment};

/// File-backed segment store. One line per segment, keyed by segment id.
/// Batch saves are all-or-nothing: the merged state is written to a temp
/// file and renamed over the original.
#[derive(Debug)]
pub struct FileSegmentStore {
    path: PathBuf,
}

impl FileSegmentStore {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every stored segment, in id order.
    pub fn read_all(&self) -> std::io::Result<Vec<Segment>> {
        Ok(self.load()?.into_values().collect())
    }

    fn load(&self) -> std::io::Result<BTreeMap<String, Segment>> {
        let mut out = BTreeMap::new();
        if !self.path.exists() {
            return Ok(out);
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match decode_segment(&line) {
                Some(segment) => {
                    out.insert(segment.id.clone(), segment);
                }
                None => warn!("skipped undecodable segment record"),
            }
        }
        Ok(out)
    }

    fn write_all(&self, rows: &BTreeMap<String, Segment>) -> std::io::Result<()> {
        let tmp_path = self.path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            for segment in rows.values() {
                writeln!(writer, "{}", encode_segment(segment))?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)
    }
}

impl SegmentStore for FileSegmentStore {
    fn save_segments(&mut self, segments: &[Segment], series_id: &str) -> std::io::Result<()> {
        let mut rows = self.load()?;
        // Replace-on-conflict: a re-uploaded series supersedes all of its
        // previous segments, not only id collisions.
        rows.retain(|_, segment| segment.series_id != series_id);
        for segment in segments {
            rows.insert(segment.id.clone(), segment.clone());
        }
        self.write_all(&rows)?;
        info!(
            series = series_id,
            saved = segments.len(),
            total = rows.len(),
            "segment batch saved"
        );
        Ok(())
    }

    fn segments_exist_for(&self, symbol: &str) -> std::io::Result<bool> {
        let prefix = format!("{}_", symbol.trim().to_uppercase());
        Ok(self
            .load()?
            .values()
            .any(|segment| segment.series_id.starts_with(&prefix)))
    }
}
