//! Tracing Setup
//!
//! Installs the global `tracing` subscriber from the logging configuration.
//!
//! # Configuration
//!
//! - `RUST_LOG`: overrides `observability.logging.level` when set
//! - `observability.logging.format`: `json` for structured output, `pretty`
//!   for local development
//!
//! # Usage
//!
//! ```rust,ignore
//! use fulfillment_engine::telemetry::init_tracing;
//!
//! init_tracing(&config.observability.logging);
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Build the level filter: `RUST_LOG` wins, then the configured level.
fn env_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber.
///
/// A second call is a no-op, which keeps tests that share a process quiet.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = env_filter(logging);

    let result = if logging.format == "pretty" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .pretty()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .json()
            .try_init()
    };

    match result {
        Ok(()) => tracing::info!(
            level = %logging.level,
            format = %logging.format,
            "Tracing initialized"
        ),
        Err(e) => tracing::debug!(error = %e, "Tracing subscriber already installed"),
    }
}
