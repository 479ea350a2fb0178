//! Logging setup for the provider process.
//!
//! The host owns stdout, so all logs go to **stderr**. Filtering follows
//! `RUST_LOG`; request tracing for the Cloud Connector client lives under the
//! `sapcc_provider::client` target.
//!
//! ```bash
//! # Every REST round trip
//! RUST_LOG=sapcc_provider::client=debug ./provider
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

fn subscriber(default_level: &str) -> impl tracing::Subscriber + Send + Sync + 'static {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    )
}

/// Initialize the global subscriber at [`DEFAULT_FILTER`].
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default(DEFAULT_FILTER);
}

/// Initialize the global subscriber with a custom default level.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Safe to call from tests that may share a process.
pub fn try_init_logging() -> bool {
    subscriber(DEFAULT_FILTER).try_init().is_ok()
}
