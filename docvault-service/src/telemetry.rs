//! Tracing bootstrap for binaries embedding the document service.

use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber writing to stderr, filtered by `RUST_LOG`
/// (default `info`). Calling it again is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init();
}
