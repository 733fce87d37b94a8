//! Logging initialization
//!
//! - Respects RUST_LOG environment variable
//! - Falls back to the config filter, then to "info"
//! - Human-readable output by default, JSON lines behind `json-logging`
//!
//! # Usage
//! ```rust,no_run
//! use modrouter::utils::init_logging;
//!
//! init_logging(None); // Uses RUST_LOG or defaults to "info"
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Build the filter: RUST_LOG wins, then `filter`, then "info"
fn env_filter(filter: Option<&str>) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    EnvFilter::new(filter.unwrap_or("info"))
}

/// Initialize human-readable logging
///
/// # Arguments
/// * `filter` - Optional log filter from config (e.g. "info", "modrouter::router=trace").
///   RUST_LOG still takes precedence.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_logging(filter: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .with(env_filter(filter))
        .try_init();
}

/// Initialize logging with JSON output (for log aggregation)
#[cfg(feature = "json-logging")]
pub fn init_json_logging(filter: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(env_filter(filter))
        .try_init();
}

/// Initialize logging from [`LoggingConfig`]
///
/// `json_format` without the `json-logging` feature falls back to plain output.
pub fn init_logging_from_config(config: Option<&LoggingConfig>) {
    let filter = config.and_then(|c| c.filter.as_deref());

    if config.map(|c| c.json_format).unwrap_or(false) {
        #[cfg(feature = "json-logging")]
        {
            init_json_logging(filter);
        }
        #[cfg(not(feature = "json-logging"))]
        {
            init_logging(filter);
        }
    } else {
        init_logging(filter);
    }
}
