use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid settings: {0}")]
    Invalid(String),

    #[error("failed to initialise logging: {0}")]
    Telemetry(String),
}
