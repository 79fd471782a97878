use crate::credential::{Credential, HasherConfig, create_credential, verify_credential};
use crate::db::sqlite::{CredentialsStorage, SqlitePool};
use crate::error::HearthError;
use tokio::task;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// Sign-up, password change and login on top of [`CredentialsStorage`].
///
/// Hashing runs on the blocking pool; the work factor makes it CPU-bound.
#[derive(Clone)]
pub struct CredentialOps {
    storage: CredentialsStorage,
    hasher: HasherConfig,
}

impl CredentialOps {
    pub fn new(pool: SqlitePool, hasher: HasherConfig) -> Self {
        Self {
            storage: CredentialsStorage::new(pool),
            hasher,
        }
    }

    pub fn storage(&self) -> &CredentialsStorage {
        &self.storage
    }

    /// Create a brand-new credential for `principal` and make it active.
    /// Used for both sign-up and password change. Returns the row id.
    pub async fn set_password(&self, principal: &str, password: String) -> Result<i64, HearthError> {
        self.store_new(principal, Zeroizing::new(password)).await
    }

    async fn store_new(
        &self,
        principal: &str,
        password: Zeroizing<String>,
    ) -> Result<i64, HearthError> {
        let cfg = self.hasher.clone();
        let cred = task::spawn_blocking(move || create_credential(&password, &cfg)).await??;
        let id = self.storage.insert(principal, &cred).await?;
        info!(principal, id, work_factor = cred.work_factor(), "credential created");
        Ok(id)
    }

    /// Check `password` against the active credential of `principal`.
    ///
    /// Unknown principals and wrong passwords both yield `false`. On success a
    /// credential made under outdated settings is replaced with a fresh one.
    pub async fn check_password(&self, principal: &str, password: String) -> Result<bool, HearthError> {
        let cred = match self.storage.latest(principal).await {
            Ok(cred) => cred,
            Err(HearthError::UnknownPrincipal(_)) => {
                debug!(principal, "no credential for principal");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let (ok, password) = verify_blocking(cred.clone(), Zeroizing::new(password)).await?;
        if ok && cred.needs_rehash(&self.hasher) {
            info!(
                principal,
                old_work_factor = cred.work_factor(),
                new_work_factor = self.hasher.work_factor,
                "replacing credential created under outdated settings"
            );
            self.store_new(principal, password).await?;
        }
        Ok(ok)
    }
}

async fn verify_blocking(
    cred: Credential,
    password: Zeroizing<String>,
) -> Result<(bool, Zeroizing<String>), HearthError> {
    let res = task::spawn_blocking(move || {
        let ok = verify_credential(&cred, &password);
        (ok, password)
    })
    .await?;
    Ok(res)
}
