pub mod config;
pub mod credential;
pub mod db;
pub mod error;
pub mod migration;
pub mod service;

pub use credential::{Credential, HasherConfig, create_credential, verify_credential};
pub use error::HearthError;
pub use migration::{Migration, MigrationRegistry, SqlMigration};
pub use service::{DatabaseInitializer, InitMode, InitReport};
