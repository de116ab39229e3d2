//! Process-wide log subscriber.
//!
//! Library code logs through the `log` facade. Binaries call
//! [`init_logging`] once to install a `tracing` fmt subscriber; `log` records
//! are forwarded to it through tracing-subscriber's `tracing-log` bridge.

use tracing_subscriber::EnvFilter;

use crate::utilities::config::LoggingConfig;

/// Build the filter: `RUST_LOG` when set, otherwise the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed; the existing one
/// is left alone.
pub fn init_logging(config: &LoggingConfig) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(true)
        .try_init()
        .is_ok()
}
