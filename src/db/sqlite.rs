use crate::credential::Credential;
use crate::db::models::DbCredential;
use crate::error::HearthError;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

pub type SqlitePool = Pool<Sqlite>;

/// Credential history backed by the `credentials` table.
///
/// Rows are only ever inserted; the newest row for a principal is its
/// active credential.
#[derive(Clone)]
pub struct CredentialsStorage {
    pool: SqlitePool,
}

impl CredentialsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Append a credential for `principal`. Returns the row id.
    pub async fn insert(&self, principal: &str, cred: &Credential) -> Result<i64, HearthError> {
        let res = sqlx::query(
            "INSERT INTO credentials (principal, credential, created_at) VALUES (?, ?, ?)",
        )
        .bind(principal)
        .bind(cred.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }

    pub async fn latest_row(&self, principal: &str) -> Result<Option<DbCredential>, HearthError> {
        let row = sqlx::query_as::<_, DbCredential>(
            r#"SELECT id, principal, credential, created_at
               FROM credentials WHERE principal = ? ORDER BY id DESC LIMIT 1"#,
        )
        .bind(principal)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Active credential for `principal`.
    pub async fn latest(&self, principal: &str) -> Result<Credential, HearthError> {
        self.latest_row(principal)
            .await?
            .ok_or_else(|| HearthError::UnknownPrincipal(principal.to_string()))?
            .try_into()
    }

    /// Number of credentials ever created for `principal`.
    pub async fn history_len(&self, principal: &str) -> Result<i64, HearthError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credentials WHERE principal = ?")
            .bind(principal)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
