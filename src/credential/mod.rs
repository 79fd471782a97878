//! Salted, iterated password credentials.
//!
//! - `hasher.rs`: derivation and constant-time verification
//! - `encoding.rs`: text form for storage in a single column

pub mod encoding;
pub mod hasher;

pub use hasher::{
    Credential, DEFAULT_SALT_LENGTH, DEFAULT_WORK_FACTOR, HashAlgorithm, HasherConfig, MAX_WORK_FACTOR,
    create_credential, create_credential_with, verify_credential,
};
