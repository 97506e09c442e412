use tracing_subscriber::EnvFilter;

/// Routes `log` records to stderr, filtered by `RUST_LOG` (default `warn`).
///
/// Stdout is left to the interactive output.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
