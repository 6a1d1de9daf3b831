//! Structured logging initialization via `tracing`.

use tracing_subscriber::EnvFilter;

/// Initialize a human-readable subscriber on stderr.
///
/// `RUST_LOG` takes precedence; otherwise `default_directive` applies, e.g.
/// `"warn"` for one-shot CLI commands. Calling this twice is harmless.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
