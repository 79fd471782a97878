use crate::config::Config;
use crate::error::HearthError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::error;

/// Supplies the per-application data directory.
pub trait AppDirectory: Send + Sync {
    fn app_directory_path(&self) -> Result<PathBuf, HearthError>;
}

/// Data directory taken from configuration, created on first use.
#[derive(Debug, Clone)]
pub struct ConfiguredAppDirectory {
    dir: PathBuf,
}

impl ConfiguredAppDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.data_dir.clone())
    }
}

impl AppDirectory for ConfiguredAppDirectory {
    fn app_directory_path(&self) -> Result<PathBuf, HearthError> {
        if self.dir.as_os_str().is_empty() {
            return Err(HearthError::AppDirectoryUnavailable(
                "data directory is not configured".to_string(),
            ));
        }
        fs::create_dir_all(&self.dir).map_err(|source| HearthError::AppDirectory {
            path: self.dir.clone(),
            source,
        })?;
        Ok(self.dir.clone())
    }
}

/// `{app_dir}/{app_name}.{db_extension}`
pub fn database_path(app_dir: &dyn AppDirectory, cfg: &Config) -> Result<PathBuf, HearthError> {
    let dir = app_dir
        .app_directory_path()
        .inspect_err(|e| error!(error = %e, "failed to resolve application data directory"))?;
    Ok(file_in(&dir, cfg))
}

fn file_in(dir: &Path, cfg: &Config) -> PathBuf {
    dir.join(format!("{}.{}", cfg.app_name, cfg.db_extension))
}
