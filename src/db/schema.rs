//! SQL DDL for the migration ledger and the builtin tables.
//! SQLite-first; column types are SQLite affinities.

/// Migration ledger:
/// - `Id` INTEGER PRIMARY KEY AUTOINCREMENT
/// - `CreatedAt` RFC3339 text, defaults to insert time
/// - `Number` UNIQUE, one row per applied migration
/// - `Description` human-readable text
pub const LEDGER_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS MigrationLedger (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    CreatedAt TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    Number INTEGER NOT NULL UNIQUE,
    Description TEXT NOT NULL
)
"#;

/// Credential history, one row per created credential. Append-only; the
/// newest row for a principal is the active one.
pub const CREDENTIALS_INIT: &str = r#"
CREATE TABLE credentials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    principal TEXT NOT NULL,
    credential TEXT NOT NULL, -- algorithm$work_factor$salt$hash
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX idx_credentials_principal ON credentials(principal);
"#;
