//! Runs a module's `sea-orm-migration` migrator against a [`Db`].
//!
//! Modules ship a `Migrator` implementing [`MigratorTrait`] and override
//! `migration_table_name()` so every module keeps its own history table.
//! The runner owns the privileged connection; modules never see it.

use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::{Db, DbError};

/// Apply every pending migration of `M`.
///
/// Already applied migrations are skipped, so running twice is a no-op.
///
/// # Errors
/// Returns [`DbError::Sea`] when a migration fails.
pub async fn run_migrations<M: MigratorTrait>(db: &Db, module: &str) -> Result<(), DbError> {
    let conn = db.sea_internal_ref();
    let pending = M::get_pending_migrations(conn).await?.len();
    if pending == 0 {
        info!(module, "no pending migrations");
        return Ok(());
    }
    M::up(conn, None).await?;
    info!(module, applied = pending, "migrations applied");
    Ok(())
}

/// Names of the migrations of `M` already applied.
///
/// # Errors
/// Returns [`DbError::Sea`] when the history table cannot be read.
pub async fn applied_migrations<M: MigratorTrait>(db: &Db) -> Result<Vec<String>, DbError> {
    let applied = M::get_applied_migrations(db.sea_internal_ref()).await?;
    Ok(applied.iter().map(|m| m.name().to_owned()).collect())
}
