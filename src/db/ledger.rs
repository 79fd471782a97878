//! Append-only record of applied migrations.

use crate::db::models::LedgerEntry;
use crate::db::schema::LEDGER_INIT;
use crate::error::HearthError;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

pub async fn create_ledger(conn: &mut SqliteConnection) -> Result<(), HearthError> {
    sqlx::query(LEDGER_INIT).execute(&mut *conn).await?;
    Ok(())
}

/// Highest recorded migration number, `None` when the ledger is empty.
pub async fn last_applied_number(
    conn: &mut SqliteConnection,
) -> Result<Option<i64>, HearthError> {
    let last: Option<i64> = sqlx::query_scalar("SELECT MAX(Number) FROM MigrationLedger")
        .fetch_one(&mut *conn)
        .await?;
    Ok(last)
}

pub async fn is_applied(conn: &mut SqliteConnection, number: i64) -> Result<bool, HearthError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM MigrationLedger WHERE Number = ?")
        .bind(number)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}

/// Append a row for `number`. Returns the row id.
pub async fn record(
    conn: &mut SqliteConnection,
    number: i64,
    description: &str,
    applied_at: DateTime<Utc>,
) -> Result<i64, HearthError> {
    let res = sqlx::query(
        "INSERT INTO MigrationLedger (Number, Description, CreatedAt) VALUES (?, ?, ?)",
    )
    .bind(number)
    .bind(description)
    .bind(applied_at)
    .execute(&mut *conn)
    .await?;
    Ok(res.last_insert_rowid())
}

/// All rows in application order.
pub async fn entries(conn: &mut SqliteConnection) -> Result<Vec<LedgerEntry>, HearthError> {
    let rows = sqlx::query_as::<_, LedgerEntry>(
        r#"SELECT Id AS id, Number AS number, Description AS description, CreatedAt AS created_at
           FROM MigrationLedger ORDER BY Id"#,
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Connection;

    async fn memory() -> SqliteConnection {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        create_ledger(&mut conn).await.unwrap();
        conn
    }

    #[tokio::test]
    async fn empty_ledger_reports_zero() {
        let mut conn = memory().await;
        assert_eq!(last_applied_number(&mut conn).await.unwrap(), None);
        assert!(!is_applied(&mut conn, 0).await.unwrap());
        assert!(entries(&mut conn).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn records_rows_and_tracks_max() {
        let mut conn = memory().await;
        record(&mut conn, 2, "second", Utc::now()).await.unwrap();
        record(&mut conn, 5, "fifth", Utc::now()).await.unwrap();

        assert_eq!(last_applied_number(&mut conn).await.unwrap(), Some(5));
        assert!(is_applied(&mut conn, 2).await.unwrap());
        assert!(!is_applied(&mut conn, 3).await.unwrap());

        let rows = entries(&mut conn).await.unwrap();
        let numbers: Vec<i64> = rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![2, 5]);
        assert_eq!(rows[1].description, "fifth");
    }

    #[tokio::test]
    async fn migration_zero_counts_as_applied() {
        let mut conn = memory().await;
        record(&mut conn, 0, "zero", Utc::now()).await.unwrap();
        assert_eq!(last_applied_number(&mut conn).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn number_is_unique() {
        let mut conn = memory().await;
        record(&mut conn, 1, "first", Utc::now()).await.unwrap();
        let err = record(&mut conn, 1, "again", Utc::now()).await.unwrap_err();
        assert!(matches!(err, HearthError::Database(_)));
    }

    #[tokio::test]
    async fn create_ledger_is_repeatable() {
        let mut conn = memory().await;
        create_ledger(&mut conn).await.unwrap();
    }
}
