//! Diagnostic tracing for the seeder.
//!
//! Diagnostics go to stderr and are controlled by `RUST_LOG`. The run summary
//! printed on stdout is product output and is unaffected.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise defaults to `warn`, or
/// `keiji_seed=info` when `verbose` is true.
///
/// # Example
/// ```bash
/// RUST_LOG=keiji_seed=debug keiji-seed run
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { "warn,keiji_seed=info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
