//! Tracing setup shared by the three entry points.

use tracing_subscriber::EnvFilter;

/// Initialize a human-readable stderr subscriber. `RUST_LOG` wins over
/// the verbosity flags when set.
pub fn init(verbose: u8, quiet: bool) {
    let filter = match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();
}
