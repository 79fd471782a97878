pub mod app_dir;
pub mod credential_ops;
pub mod initializer;

pub use app_dir::{AppDirectory, ConfiguredAppDirectory, database_path};
pub use credential_ops::CredentialOps;
pub use initializer::{DatabaseInitializer, InitMode, InitReport};
