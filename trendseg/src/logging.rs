use tracing_subscriber::EnvFilter;

/// Installs the process-wide subscriber. Level comes from `RUST_LOG`, info
/// by default; repeat calls are harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
