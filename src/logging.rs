//! Tracing subscriber setup shared by the binaries

use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to stderr.
///
/// Filter comes from `SHEETSTORE_LOG`, then `RUST_LOG`, then `default_directives`.
/// Calling it twice is harmless.
pub fn init(default_directives: &str) {
    let filter = EnvFilter::try_from_env("SHEETSTORE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| default_directives.into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
