//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Installs a stderr subscriber filtered by `BCT_LOG` (or `default_filter`).
/// Later calls are no-ops.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_env("BCT_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
