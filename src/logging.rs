//! Tracing subscriber setup for embedding hosts.
//!
//! The adapter only emits events; translating them into log output is the
//! host's call. Hosts that do not bring their own subscriber can install
//! one from the serving configuration here.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install a global subscriber from the logging configuration.
///
/// `RUST_LOG` takes precedence over the configured level. Safe to call more
/// than once; later calls are no-ops.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    if config.json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    }
}
