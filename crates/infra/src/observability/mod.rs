//! Tracing subscriber initialisation
//!
//! The library itself only emits `tracing` events. Binaries and tests that
//! want output call [`init_tracing`] once at start-up.
//!
//! Filter priority: `RUST_LOG` first, then [`LoggingConfig::level`], then
//! `info`.

use paperlens_domain::{ClientError, LogFormat, LoggingConfig, Result};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const FALLBACK_DIRECTIVE: &str = "info";

/// Install the global subscriber.
///
/// # Errors
///
/// Returns `ClientError::Config` if a global subscriber is already set.
/// An unparseable level falls back to `info` instead of failing.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true).pretty())
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true).compact())
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
    };

    installed.map_err(|e| ClientError::Config(format!("Tracing already initialised: {}", e)))
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_DIRECTIVE))
}
