use crate::config::Config;
use crate::db::{LedgerEntry, SqlitePool, ledger};
use crate::error::HearthError;
use crate::migration::{MigrationRegistry, Selection, runner};
use crate::service::app_dir::{AppDirectory, database_path};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{ConnectOptions, Connection, SqliteConnection};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Serializes every initialization in the process.
static INIT_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMode {
    /// No database file existed; it was created and every migration ran.
    Created,
    /// An existing database received the migrations newer than its ledger.
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub path: PathBuf,
    pub mode: InitMode,
    /// Numbers committed by this run, ascending.
    pub applied: Vec<i64>,
}

/// Creates or upgrades the application's single database file.
pub struct DatabaseInitializer {
    app_dir: Box<dyn AppDirectory>,
    config: Config,
    registry: MigrationRegistry,
}

impl DatabaseInitializer {
    pub fn new(
        app_dir: impl AppDirectory + 'static,
        config: Config,
        registry: MigrationRegistry,
    ) -> Self {
        Self {
            app_dir: Box::new(app_dir),
            config,
            registry,
        }
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    /// Resolve the database file location. Fails before any database I/O.
    pub fn database_path(&self) -> Result<PathBuf, HearthError> {
        database_path(self.app_dir.as_ref(), &self.config)
    }

    /// Ensure the database exists and every pending migration is applied
    /// exactly once, in ascending order.
    ///
    /// The whole sequence holds a process-wide lock. The first failing
    /// migration is rolled back and stops the run.
    pub async fn initialize_database(&self) -> Result<InitReport, HearthError> {
        let _guard = INIT_LOCK.lock().await;

        let path = self.database_path()?;
        self.initialize_at(&path).await.inspect_err(|e| {
            error!(path = %path.display(), error = %e, "database initialization failed");
        })
    }

    async fn initialize_at(&self, path: &Path) -> Result<InitReport, HearthError> {
        let exists = path.try_exists()?;
        let mut conn = connect(path, !exists).await?;

        let (mode, selection) = if exists {
            // an interrupted first run can leave a file without a ledger
            ledger::create_ledger(&mut conn).await?;
            let last = ledger::last_applied_number(&mut conn).await?;
            info!(path = %path.display(), last = ?last, "updating database");
            // an empty ledger means nothing committed yet, migration 0 included
            let selection = match last {
                Some(last) => Selection::After(last),
                None => Selection::All,
            };
            (InitMode::Updated, selection)
        } else {
            info!(path = %path.display(), "creating database");
            ledger::create_ledger(&mut conn).await?;
            (InitMode::Created, Selection::All)
        };

        let pending = self.registry.select(selection);
        if pending.is_empty() {
            info!(path = %path.display(), "no pending migrations");
        }
        let applied = runner::apply_all(&mut conn, &pending).await?;
        conn.close().await?;

        info!(
            path = %path.display(),
            count = applied.len(),
            "database ready"
        );
        Ok(InitReport {
            path: path.to_path_buf(),
            mode,
            applied,
        })
    }

    /// Open a pool on the initialized database file.
    pub async fn open_pool(&self) -> Result<SqlitePool, HearthError> {
        let path = self.database_path()?;
        let pool = SqlitePoolOptions::new()
            .connect_with(SqliteConnectOptions::new().filename(&path))
            .await?;
        Ok(pool)
    }

    /// Rows of the migration ledger, in application order.
    pub async fn ledger_entries(&self) -> Result<Vec<LedgerEntry>, HearthError> {
        let path = self.database_path()?;
        let mut conn = connect(&path, false).await?;
        let rows = ledger::entries(&mut conn).await?;
        conn.close().await?;
        Ok(rows)
    }
}

async fn connect(path: &Path, create: bool) -> Result<SqliteConnection, HearthError> {
    let conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .connect()
        .await?;
    Ok(conn)
}
