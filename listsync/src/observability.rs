//! Tracing setup

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Result};

/// Initialize tracing from configuration
///
/// JSON-formatted output with an env-filter seeded from `log_level`;
/// `RUST_LOG` still overrides at runtime.
pub fn init_tracing(config: &Config) -> Result<()> {
    let log_level = config.log_level.clone();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .map_err(|e| crate::error::Error::Tracing(e.to_string()))?;

    tracing::info!("Tracing initialized");

    Ok(())
}
