//! Global `tracing` subscriber for the binaries.

use tracing_subscriber::EnvFilter;

use crate::error::SettingsError;
use crate::settings::{LogFormat, LogSettings};

/// Installs the subscriber. `RUST_LOG`, when set, wins over `log.level`.
pub fn init_tracing(log: &LogSettings) -> Result<(), SettingsError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .map_err(|e| SettingsError::Invalid(format!("log.level '{}': {e}", log.level)))?;

    let installed = match log.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    installed.map_err(|e| SettingsError::Telemetry(e.to_string()))
}
