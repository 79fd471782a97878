use super::{MigrationRegistry, SqlMigration};
use crate::db::schema::CREDENTIALS_INIT;
use crate::error::HearthError;

/// Migrations shipped with the crate.
pub fn builtin_registry() -> Result<MigrationRegistry, HearthError> {
    MigrationRegistry::new().with(SqlMigration::new(
        1,
        "create credentials table",
        CREDENTIALS_INIT,
    ))
}
