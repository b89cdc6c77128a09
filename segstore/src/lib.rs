//! Storage collaborator for segment records.
//!
//! Implements `trendseg::SegmentStore` three ways:
//! - `FileSegmentStore`: line records on disk, all-or-nothing batch save
//!   with replace-on-conflict keyed by segment id (temp file + rename).
//! - `MemorySegmentStore`: in-process map, mainly for tests and dry runs.
//! - `AsyncSegmentStore`: background writer thread over a bounded queue,
//!   non-blocking enqueue from the caller's thread.

mod async_store;
mod memory;
mod record;
mod store;

pub use async_store::{AsyncSegmentStore, AsyncSegmentStoreConfig};
pub use memory::MemorySegmentStore;
pub use record::{decode_segment, encode_segment};
pub use store::FileSegmentStore;
