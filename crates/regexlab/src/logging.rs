//! Logging setup.
//!
//! The crate itself only emits `tracing` events. Applications that want
//! them printed call [`init_logging`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{LabError, Result};

/// Build the event filter for a configuration.
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| LabError::config(format!("invalid log level '{}': {e}", config.level)))
}

/// Install a global fmt subscriber.
///
/// Fails if the level is not a valid filter directive or a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| LabError::config(format!("failed to install subscriber: {e}")))
}
