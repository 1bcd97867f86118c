//! `tracing`-based logging setup (§10.1).

use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber. Defaults to `info`,
/// overridable with `RUST_LOG`.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true)
        .with_file(false)
        .init();
}
