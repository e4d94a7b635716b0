//! # configs
//!
//! Settings for the blood bank binaries and the logging setup they share.

pub mod error;
pub mod settings;
pub mod telemetry;

pub use error::SettingsError;
pub use settings::{
    EngineSettings, LogFormat, LogSettings, Settings, StoreBackend, StoreSettings,
};
pub use telemetry::init_tracing;
