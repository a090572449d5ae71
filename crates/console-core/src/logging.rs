//! Logging initialization for the console.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for the console.
///
/// Log level comes from the `EXAMDESK_LOG` env var when set, otherwise the
/// provided default. Output goes to stderr so command output on stdout
/// stays machine-readable.
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env("EXAMDESK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
