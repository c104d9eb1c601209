//! Connection and module wiring shared by every command.

use std::sync::Arc;

use anyhow::Context;
use authz_resolver::AuthZResolverModule;
use directory::DirectoryModule;
use geography::GeographyModule;
use geography_sdk::GeographyClient;
use plans::PlansModule;
use rb_db::Db;
use rb_db::migration_runner::{applied_migrations, run_migrations};
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;

/// Every module, wired on one database handle.
pub struct App {
    pub geography: Arc<dyn GeographyClient>,
    pub authz: AuthZResolverModule,
    pub directory: DirectoryModule,
    pub plans: PlansModule,
}

impl App {
    /// Initialize the modules in dependency order.
    ///
    /// # Errors
    /// Fails when the geography snapshot cannot be loaded, when migrations
    /// are pending, or when the configured permission overrides conflict.
    pub async fn start(db: &Db, cfg: &AppConfig) -> anyhow::Result<Self> {
        let geography = GeographyModule::init(db, &cfg.geography).await?.client();
        let authz = AuthZResolverModule::init(Arc::clone(&geography), &cfg.authz)?;
        let directory = DirectoryModule::init(db, Arc::clone(&geography)).await?;
        let plans = PlansModule::new(db, Arc::clone(&geography), authz.enforcer(), &cfg.plans);
        info!("all modules initialized");
        Ok(Self {
            geography,
            authz,
            directory,
            plans,
        })
    }
}

/// Open the configured database.
///
/// # Errors
/// Fails when the pool cannot be established; the error names the DSN with
/// credentials masked.
pub async fn connect(cfg: &AppConfig) -> anyhow::Result<Db> {
    let dsn = cfg.db.redacted_dsn();
    info!(dsn = %dsn, "connecting to database");
    cfg.db
        .connect()
        .await
        .with_context(|| format!("failed to connect to {dsn}"))
}

/// Migration history of one module after a `migrate` run.
#[derive(Debug, Serialize)]
pub struct MigrationReport {
    pub module: &'static str,
    pub applied: Vec<String>,
}

/// Apply pending migrations of every module that owns tables.
///
/// Geography runs first: its seed data is what the other modules point at.
///
/// # Errors
/// Fails on the first migration that cannot be applied.
pub async fn migrate(db: &Db) -> anyhow::Result<Vec<MigrationReport>> {
    run_migrations::<geography::Migrator>(db, geography::MODULE_NAME)
        .await
        .context("geography migrations failed")?;
    run_migrations::<directory::Migrator>(db, directory::MODULE_NAME)
        .await
        .context("directory migrations failed")?;
    run_migrations::<plans::Migrator>(db, plans::MODULE_NAME)
        .await
        .context("plans migrations failed")?;

    Ok(vec![
        MigrationReport {
            module: geography::MODULE_NAME,
            applied: applied_migrations::<geography::Migrator>(db).await?,
        },
        MigrationReport {
            module: directory::MODULE_NAME,
            applied: applied_migrations::<directory::Migrator>(db).await?,
        },
        MigrationReport {
            module: plans::MODULE_NAME,
            applied: applied_migrations::<plans::Migrator>(db).await?,
        },
    ])
}
