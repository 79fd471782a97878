//! Database module: ledger, models and storage for the embedded database.
//!
//! Layout:
//! - `schema.rs`: SQL DDL (SQLite-first)
//! - `ledger.rs`: the append-only migration ledger
//! - `models.rs`: Rust structs mirroring DB rows and conversions
//! - `sqlite.rs`: credential storage

pub mod ledger;
pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{DbCredential, LedgerEntry};
pub use schema::{CREDENTIALS_INIT, LEDGER_INIT};
pub use sqlite::{CredentialsStorage, SqlitePool};
