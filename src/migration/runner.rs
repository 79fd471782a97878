use super::Migration;
use crate::db::ledger;
use crate::error::HearthError;
use chrono::Utc;
use sqlx::{Connection, SqliteConnection};
use tracing::{error, info, warn};

/// Apply one migration in its own transaction.
///
/// The ledger row and the migration's effects commit together or not at all.
pub async fn apply_migration(
    conn: &mut SqliteConnection,
    migration: &dyn Migration,
) -> Result<(), HearthError> {
    let number = migration.number();
    let description = migration.description();
    let mut tx = conn.begin().await?;

    if ledger::is_applied(&mut *tx, number).await? {
        tx.rollback().await?;
        error!(number, description, "migration already recorded in ledger");
        return Err(HearthError::DuplicateMigration(number));
    }

    let result = migration.apply(&mut *tx).await;
    if let Err(e) = result {
        if let Err(rb) = tx.rollback().await {
            warn!(number, error = %rb, "rollback after failed migration also failed");
        }
        error!(number, description, error = %e, "migration failed; rolled back");
        return Err(HearthError::MigrationFailed {
            number,
            source: Box::new(e),
        });
    }

    // dropping tx on error rolls back
    ledger::record(&mut *tx, number, description, Utc::now()).await?;
    tx.commit().await?;

    info!(number, description, "migration applied");
    Ok(())
}

/// Apply `migrations` in the order given, stopping at the first failure.
/// Returns the numbers that were committed.
pub async fn apply_all(
    conn: &mut SqliteConnection,
    migrations: &[&dyn Migration],
) -> Result<Vec<i64>, HearthError> {
    let mut applied = Vec::with_capacity(migrations.len());
    for migration in migrations {
        apply_migration(conn, *migration).await?;
        applied.push(migration.number());
    }
    Ok(applied)
}
