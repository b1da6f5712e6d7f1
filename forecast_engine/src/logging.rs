//! Tracing subscriber setup for binaries
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the executable.

use crate::error::{ForecastError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "forecast_engine=info";

/// Install a formatting subscriber filtered by `RUST_LOG`, falling back to `default_filter`
pub fn init_tracing(default_filter: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .try_init()
        .map_err(|e| ForecastError::ConfigError(format!("Failed to install tracing subscriber: {}", e)))
}
