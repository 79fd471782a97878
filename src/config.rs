use crate::credential::HasherConfig;
use crate::error::HearthError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime configuration.
///
/// Defaults are overridden by `HEARTH_*` environment variables; nested
/// hasher settings use a double underscore (`HEARTH_HASHER__WORK_FACTOR`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Stem of the database file name.
    pub app_name: String,
    /// Per-application data directory holding the database file.
    ///
    /// Defaults to `data` relative to the working directory. Installed
    /// deployments set `HEARTH_DATA_DIR` to the per-user location, or supply
    /// their own [`AppDirectory`](crate::service::AppDirectory).
    pub data_dir: PathBuf,
    pub db_extension: String,
    pub loglevel: String,
    pub hasher: HasherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            data_dir: PathBuf::from("data"),
            db_extension: "sqlite".to_string(),
            loglevel: "info".to_string(),
            hasher: HasherConfig::default(),
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("HEARTH_").split("__"))
    }

    pub fn from_env() -> Result<Self, HearthError> {
        Ok(Self::figment().extract()?)
    }
}
