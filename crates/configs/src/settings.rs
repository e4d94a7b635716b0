//! # Settings
//!
//! Layered configuration: built-in defaults, then an optional TOML file, then
//! `BLOODBANK__SECTION__KEY` environment variables. A `.env` file is read first
//! so its variables take part in the last layer.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::SettingsError;

pub const DEFAULT_CONFIG_FILE: &str = "bloodbank.toml";
pub const CONFIG_PATH_VAR: &str = "BLOODBANK_CONFIG";
const ENV_PREFIX: &str = "BLOODBANK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    /// One JSON file per collection under `data_dir`.
    JsonFile,
    /// Process-local; gone on exit.
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
    /// Prefix for collection keys, e.g. `bloodbank_donors`.
    pub namespace: String,
    pub seed_on_start: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineSettings {
    pub strict_references: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub store: StoreSettings,
    pub engine: EngineSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Loads `.env`, then the file named by `BLOODBANK_CONFIG` (or `bloodbank.toml`).
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        let path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    /// Defaults, then `path` if it exists, then environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .set_default("store.backend", "json-file")?
            .set_default("store.data_dir", "./data")?
            .set_default("store.namespace", "bloodbank")?
            .set_default("store.seed_on_start", true)?
            .set_default("engine.strict_references", false)?
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.store.namespace.trim().is_empty() {
            return Err(SettingsError::Invalid("store.namespace must not be empty".into()));
        }
        if self.log.level.trim().is_empty() {
            return Err(SettingsError::Invalid("log.level must not be empty".into()));
        }
        Ok(())
    }
}
