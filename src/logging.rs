//! Logging setup
//!
//! This crate only emits `tracing` events; an embedding binary normally
//! installs its own subscriber. `init` is offered for hosts (and tests) that
//! have none.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG` when set, otherwise defaults to `keyroot=<level>,info`.
/// Later calls are no-ops, so tests can invoke it freely.
pub fn init(log_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("keyroot={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
