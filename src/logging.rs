use tracing_subscriber::EnvFilter;

/// Initialize tracing for the CLI. Configurable via RUST_LOG, defaults to `warn`.
///
/// Logs go to stderr so `export -` output stays clean. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
