//! Structured logging setup and a logging state listener.

use crate::core::State;
use crate::engine::Listener;
use std::sync::{Arc, OnceLock};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `WAYPOINT_LOG=debug`.
pub const LOG_ENV: &str = "WAYPOINT_LOG";

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install a `tracing` fmt subscriber filtered by `WAYPOINT_LOG`.
///
/// Safe to call repeatedly; an already installed global subscriber is kept.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_err()
        {
            tracing::debug!("global tracing subscriber already initialized");
        }
    });
}

/// Listener that logs every committed transition.
pub fn logging_listener<S: State>() -> Listener<S> {
    Arc::new(|from: &S, to: &S| {
        tracing::info!(from = from.name(), to = to.name(), "state changed");
    })
}
