//! Asynchronous wrapper over the file store: the caller enqueues batches
//! without blocking, a background thread applies them in order.

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender, TrySendError};

use trendseg::{Segment, SegmentStore};

use crate::store::FileSegmentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsyncSegmentStoreConfig {
    /// Capacity of the bounded batch queue.
    pub queue_capacity: usize,
}

impl Default for AsyncSegmentStoreConfig {
    fn default() -> Self {
        Self { queue_capacity: 256 }
    }
}

enum AsyncStoreMessage {
    Batch {
        segments: Vec<Segment>,
        series_id: String,
    },
    Flush(Sender<std::io::Result<()>>),
    Shutdown(Sender<std::io::Result<()>>),
}

#[derive(Debug)]
pub struct AsyncSegmentStore {
    path: PathBuf,
    sender: Sender<AsyncStoreMessage>,
    worker: Option<JoinHandle<std::io::Result<()>>>,
}

impl AsyncSegmentStore {
    pub fn open(path: impl AsRef<Path>, config: AsyncSegmentStoreConfig) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let queue_capacity = config.queue_capacity.max(1);
        let (tx, rx) = channel::bounded(queue_capacity);

        let worker_path = path.clone();
        let worker = thread::Builder::new()
            .name("segstore-async-writer".to_string())
            .spawn(move || run_worker(worker_path, rx))
            .map_err(|error| std::io::Error::other(error.to_string()))?;

        Ok(Self {
            path,
            sender: tx,
            worker: Some(worker),
        })
    }

    /// Non-blocking enqueue of one series' batch. Returns `WouldBlock` when
    /// the queue is full.
    pub fn enqueue_batch(&self, segments: &[Segment], series_id: &str) -> std::io::Result<()> {
        self.try_send(AsyncStoreMessage::Batch {
            segments: segments.to_vec(),
            series_id: series_id.to_string(),
        })
    }

    /// Waits until every batch enqueued so far has been applied.
    pub fn flush(&self) -> std::io::Result<()> {
        let (ack_tx, ack_rx) = channel::bounded(1);
        self.try_send(AsyncStoreMessage::Flush(ack_tx))?;
        ack_rx.recv().map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "async store flush ack channel closed",
            )
        })?
    }

    pub fn close(mut self) -> std::io::Result<()> {
        self.shutdown_and_join()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_send(&self, message: AsyncStoreMessage) -> std::io::Result<()> {
        match self.sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "async store queue is full",
            )),
            Err(TrySendError::Disconnected(_)) => Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "async store worker is disconnected",
            )),
        }
    }

    fn shutdown_and_join(&mut self) -> std::io::Result<()> {
        if self.worker.is_none() {
            return Ok(());
        }

        // The shutdown message must block until a queue slot frees up: a
        // try_send here can fail on a saturated queue and leave the worker
        // parked in recv() forever while join() waits on it.
        let (ack_tx, ack_rx) = channel::bounded(1);
        let send_result = self.sender.send(AsyncStoreMessage::Shutdown(ack_tx));
        let ack_result = match send_result {
            Ok(()) => ack_rx.recv().map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "async store shutdown ack channel closed",
                )
            })?,
            // Worker already gone; join() below surfaces its result.
            Err(channel::SendError(_)) => Ok(()),
        };

        let join_result = self.worker.take().map(|handle| {
            handle
                .join()
                .map_err(|_| std::io::Error::other("async store worker panicked"))
        });
        if let Some(result) = join_result {
            let worker_result = result?;
            worker_result?;
        }

        ack_result
    }
}

impl Drop for AsyncSegmentStore {
    fn drop(&mut self) {
        let _ = self.shutdown_and_join();
    }
}

fn run_worker(path: PathBuf, rx: Receiver<AsyncStoreMessage>) -> std::io::Result<()> {
    let mut store = FileSegmentStore::open(path)?;
    while let Ok(message) = rx.recv() {
        match message {
            AsyncStoreMessage::Batch {
                segments,
                series_id,
            } => {
                store.save_segments(&segments, &series_id)?;
            }
            AsyncStoreMessage::Flush(ack_tx) => {
                let _ = ack_tx.send(Ok(()));
            }
            AsyncStoreMessage::Shutdown(ack_tx) => {
                let _ = ack_tx.send(Ok(()));
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{AsyncSegmentStore, AsyncSegmentStoreConfig};
    use crate::store::FileSegmentStore;
    use trendseg::{SchemaType, Segment, TrendDirection};

    fn segment(ordinal: usize) -> Segment {
        Segment {
            id: format!("BNP_2024-03-15_{ordinal:03}"),
            series_id: "BNP_2024-03-15".to_string(),
            direction: TrendDirection::Up,
            x0: Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            min_price: 50.0,
            max_price: 52.0,
            average_price: 51.0,
            original_point_count: 12,
            point_count: 12,
            points_in_region: 8,
            red_point_count: 5,
            green_point_count: 6,
            schema: SchemaType::R,
            pattern_point: None,
            start_index: 0,
            end_index: 11,
            is_result_correct: None,
            result_interval: None,
            ml_model_name: None,
            ml_classed: None,
        }
    }

    #[test]
    fn enqueue_flush_and_read_back() {
        let path = std::env::temp_dir().join(format!(
            "segstore_async_test_{}_{}.log",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));

        let store = AsyncSegmentStore::open(&path, AsyncSegmentStoreConfig::default())
            .expect("async store should open");
        store
            .enqueue_batch(&[segment(0), segment(1)], "BNP_2024-03-15")
            .expect("enqueue should succeed");
        store.flush().expect("flush should succeed");
        store.close().expect("close should succeed");

        let restored = FileSegmentStore::open(&path)
            .expect("reopen")
            .read_all()
            .expect("read back should succeed");
        assert_eq!(restored.len(), 2);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn close_completes_while_queue_is_saturated() {
        let path = std::env::temp_dir().join(format!(
            "segstore_async_saturated_{}_{}.log",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));

        // Single-slot queue so the writer falls behind while we enqueue.
        let store = AsyncSegmentStore::open(&path, AsyncSegmentStoreConfig { queue_capacity: 1 })
            .expect("async store should open");
        let mut accepted = 0usize;
        while accepted < 50 {
            let series_id = format!("S{accepted:03}_2024-03-15");
            let mut batch = segment(accepted);
            batch.series_id = series_id.clone();
            batch.id = format!("{series_id}_000");
            match store.enqueue_batch(&[batch], &series_id) {
                Ok(()) => accepted += 1,
                Err(err) => {
                    assert_eq!(err.kind(), std::io::ErrorKind::WouldBlock);
                    std::thread::yield_now();
                }
            }
        }

        // Must drain the backlog and return even if the queue was full when
        // close was called.
        store.close().expect("close should succeed");

        let restored = FileSegmentStore::open(&path)
            .expect("reopen")
            .read_all()
            .expect("read back should succeed");
        assert_eq!(restored.len(), 50);

        let _ = std::fs::remove_file(path);
    }
}
