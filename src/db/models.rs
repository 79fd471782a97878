use crate::credential::Credential;
use crate::error::HearthError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One applied migration as recorded in `MigrationLedger`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct LedgerEntry {
    pub id: i64,
    pub number: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbCredential {
    pub id: i64,
    pub principal: String,
    pub credential: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbCredential> for Credential {
    type Error = HearthError;

    fn try_from(d: DbCredential) -> Result<Self, Self::Error> {
        d.credential.parse()
    }
}
