//! Numbered, irreversible schema migrations.
//!
//! Migrations are registered explicitly in a [`MigrationRegistry`]; the
//! registry owns ordering and rejects duplicate numbers up front. The ledger
//! re-check in [`runner`] still guards each apply.

pub mod builtin;
pub mod runner;

use crate::error::HearthError;
use futures::future::BoxFuture;
use sqlx::SqliteConnection;
use std::collections::BTreeMap;
use tracing::error;

/// One irreversible, numbered schema or data change.
pub trait Migration: Send + Sync {
    /// Unique, non-negative. Defines application order.
    fn number(&self) -> i64;

    fn description(&self) -> &str;

    /// Run the change on `conn`, which is inside the migration's transaction.
    fn apply<'a>(&'a self, conn: &'a mut SqliteConnection) -> BoxFuture<'a, Result<(), HearthError>>;
}

/// A migration whose body is a script of one or more SQL statements.
#[derive(Debug, Clone)]
pub struct SqlMigration {
    number: i64,
    description: String,
    sql: String,
}

impl SqlMigration {
    pub fn new(number: i64, description: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            number,
            description: description.into(),
            sql: sql.into(),
        }
    }
}

impl Migration for SqlMigration {
    fn number(&self) -> i64 {
        self.number
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn apply<'a>(&'a self, conn: &'a mut SqliteConnection) -> BoxFuture<'a, Result<(), HearthError>> {
        Box::pin(async move {
            // raw_sql lets SQLite do the statement splitting, so trigger
            // bodies and `;` inside literals stay intact
            sqlx::Executor::execute(&mut *conn, sqlx::raw_sql(&self.sql)).await?;
            Ok(())
        })
    }
}

/// Which registered migrations a run should apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every migration with `number >= 0` (fresh database).
    All,
    /// Migrations with `number > last` (existing database).
    After(i64),
}

/// Explicit list of known migrations, kept ordered by number.
#[derive(Default)]
pub struct MigrationRegistry {
    migrations: BTreeMap<i64, Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a migration. Negative and already-registered numbers are rejected.
    pub fn register(&mut self, migration: Box<dyn Migration>) -> Result<(), HearthError> {
        let number = migration.number();
        if number < 0 {
            error!(number, "rejecting migration with negative number");
            return Err(HearthError::InvalidMigrationNumber(number));
        }
        if let Some(existing) = self.migrations.get(&number) {
            error!(
                number,
                existing = existing.description(),
                rejected = migration.description(),
                "duplicate migration number"
            );
            return Err(HearthError::DuplicateMigration(number));
        }
        self.migrations.insert(number, migration);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, migration: impl Migration + 'static) -> Result<Self, HearthError> {
        self.register(Box::new(migration))?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Registered numbers in ascending order.
    pub fn numbers(&self) -> Vec<i64> {
        self.migrations.keys().copied().collect()
    }

    /// Selected migrations in ascending order of number.
    pub fn select(&self, selection: Selection) -> Vec<&dyn Migration> {
        let floor = match selection {
            Selection::All => 0,
            Selection::After(last) => last.saturating_add(1),
        };
        self.migrations
            .range(floor..)
            .map(|(_, m)| m.as_ref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(number: i64) -> SqlMigration {
        SqlMigration::new(number, format!("noop {number}"), "")
    }

    #[test]
    fn orders_by_number_regardless_of_registration_order() {
        let registry = MigrationRegistry::new()
            .with(noop(3))
            .and_then(|r| r.with(noop(1)))
            .and_then(|r| r.with(noop(2)))
            .unwrap();
        assert_eq!(registry.numbers(), vec![1, 2, 3]);
        let picked: Vec<i64> = registry.select(Selection::All).iter().map(|m| m.number()).collect();
        assert_eq!(picked, vec![1, 2, 3]);
    }

    #[test]
    fn rejects_duplicate_numbers() {
        let mut registry = MigrationRegistry::new();
        registry.register(Box::new(noop(7))).unwrap();
        let err = registry.register(Box::new(noop(7))).unwrap_err();
        assert!(matches!(err, HearthError::DuplicateMigration(7)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.select(Selection::All)[0].description(), "noop 7");
    }

    #[tokio::test]
    async fn sql_body_may_contain_triggers_and_semicolon_literals() {
        use sqlx::Connection;

        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        let m = SqlMigration::new(
            1,
            "audit trigger",
            r#"
            CREATE TABLE a (v TEXT NOT NULL);
            CREATE TABLE log (v TEXT NOT NULL);
            CREATE TRIGGER a_ins AFTER INSERT ON a BEGIN
                INSERT INTO log VALUES (new.v);
            END;
            INSERT INTO a VALUES ('x;y');
            "#,
        );
        m.apply(&mut conn).await.unwrap();

        let logged: Vec<String> = sqlx::query_scalar("SELECT v FROM log")
            .fetch_all(&mut conn)
            .await
            .unwrap();
        assert_eq!(logged, vec!["x;y".to_string()]);
    }

    #[test]
    fn rejects_negative_numbers() {
        let err = MigrationRegistry::new().with(noop(-1)).err().unwrap();
        assert!(matches!(err, HearthError::InvalidMigrationNumber(-1)));
    }

    #[test]
    fn after_selects_strictly_greater_numbers() {
        let registry = MigrationRegistry::new()
            .with(noop(0))
            .and_then(|r| r.with(noop(1)))
            .and_then(|r| r.with(noop(4)))
            .unwrap();
        let picked: Vec<i64> = registry
            .select(Selection::After(1))
            .iter()
            .map(|m| m.number())
            .collect();
        assert_eq!(picked, vec![4]);
        assert_eq!(registry.select(Selection::All).len(), 3);
        assert!(registry.select(Selection::After(4)).is_empty());
    }
}
