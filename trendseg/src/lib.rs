pub mod bar;
pub mod classifier;
pub mod config;
pub mod constant;
pub mod engine;
pub mod logging;
pub mod manager;
pub mod normalizer;
pub mod render;
pub mod segment;
pub mod segmenter;
pub mod series;
pub mod stats;

pub use bar::Bar;
pub use config::EngineConfig;
pub use constant::{EngineError, ReviewTier, SchemaType, TrendDirection};
pub use engine::{IngestOutcome, SegmentStore, SegmentationEngine};
pub use logging::init_logging;
pub use manager::SegmentManager;
pub use normalizer::{RawQuote, from_keyed, from_tabular, parse_series_identity};
pub use render::{RenderInput, SegmentRenderer};
pub use segment::{Segment, SegmentBuilder, parse_pattern_point};
pub use segmenter::{RawRegion, scan_regions};
pub use series::Series;
pub use stats::{RegionStats, fallback_points_in_region};
