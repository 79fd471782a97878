use sqlx::Error as SqlxError;
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum HearthError {
    #[error("application data directory {path} is not accessible: {source}")]
    AppDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("application data directory unavailable: {0}")]
    AppDirectoryUnavailable(String),

    #[error("migration {0} is already recorded in the ledger")]
    DuplicateMigration(i64),

    #[error("migration number must be non-negative, got {0}")]
    InvalidMigrationNumber(i64),

    #[error("migration {number} failed: {source}")]
    MigrationFailed {
        number: i64,
        #[source]
        source: Box<HearthError>,
    },

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("secure random source failed: {0}")]
    RandomSource(String),

    #[error("invalid hasher settings: {0}")]
    InvalidHasherConfig(String),

    #[error("invalid credential encoding: {0}")]
    InvalidCredentialEncoding(String),

    #[error("no credential stored for principal {0}")]
    UnknownPrincipal(String),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Config error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl HearthError {
    /// Path and directory failures happen before any database I/O.
    pub fn is_path_error(&self) -> bool {
        matches!(
            self,
            HearthError::AppDirectory { .. } | HearthError::AppDirectoryUnavailable(_)
        )
    }
}

impl From<figment::Error> for HearthError {
    fn from(e: figment::Error) -> Self {
        HearthError::Config(Box::new(e))
    }
}
