use std::process::ExitCode;

use tracing::error;

use segstore::FileSegmentStore;
use trendseg::{EngineConfig, IngestOutcome, SegmentationEngine, Series};

fn main() -> ExitCode {
    trendseg::init_logging();

    let mut args = std::env::args().skip(1);
    let Some(file_path) = args.next() else {
        eprintln!("usage: ingest <series-file> [config-file]");
        return ExitCode::FAILURE;
    };
    let config = match args.next() {
        Some(config_path) => match EngineConfig::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                error!(%err, "failed to load config");
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };

    match ingest(&file_path, config) {
        Ok(IngestOutcome::Stored(count)) => {
            println!("stored {count} segments from {file_path}");
            ExitCode::SUCCESS
        }
        Ok(IngestOutcome::NoSegments) => {
            println!("no segments detected in {file_path}");
            ExitCode::SUCCESS
        }
        Ok(IngestOutcome::AlreadySegmented) => {
            println!("segments already exist for {file_path}, nothing written");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "ingestion failed, nothing persisted");
            ExitCode::FAILURE
        }
    }
}

fn ingest(file_path: &str, config: EngineConfig) -> Result<IngestOutcome, Box<dyn std::error::Error>> {
    let (symbol, date) = trendseg::parse_series_identity(file_path)?;
    let text = std::fs::read_to_string(file_path)?;
    let bars = trendseg::from_tabular(&text)?;
    let series = Series::new(symbol, date, bars)?;

    let store_path =
        std::env::var("TRENDSEG_STORE").unwrap_or_else(|_| "data/segments.log".to_string());
    let mut store = FileSegmentStore::open(store_path)?;

    let engine = SegmentationEngine::new(config);
    Ok(engine.run(&series, &mut store)?)
}
