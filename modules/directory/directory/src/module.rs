use std::sync::Arc;

use anyhow::{Context, bail};
use geography_sdk::GeographyClient;
use rb_db::Db;
use rb_db::migration_runner::applied_migrations;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::domain::service::Service;
use crate::infra::storage::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmDirectoryRepository;

pub const MODULE_NAME: &str = "directory";

/// The service wired to its `SeaORM` repository.
pub type DirectoryService = Service<SeaOrmDirectoryRepository>;

#[derive(Clone)]
pub struct DirectoryModule {
    service: Arc<DirectoryService>,
}

impl DirectoryModule {
    /// Wire the directory on top of a migrated database.
    ///
    /// # Errors
    /// Fails when the directory tables are missing or behind.
    pub async fn init(db: &Db, geography: Arc<dyn GeographyClient>) -> anyhow::Result<Self> {
        info!("Initializing directory module");

        let applied = applied_migrations::<Migrator>(db)
            .await
            .context("failed to read directory migration history")?;
        let pending: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_owned())
            .filter(|name| !applied.contains(name))
            .collect();
        if !pending.is_empty() {
            bail!(
                "directory migrations pending: {}; run the migrate command first",
                pending.join(", ")
            );
        }

        let repo = Arc::new(SeaOrmDirectoryRepository::new());
        let service = Arc::new(Service::new(db.clone(), repo, geography));
        Ok(Self { service })
    }

    #[must_use]
    pub fn service(&self) -> Arc<DirectoryService> {
        Arc::clone(&self.service)
    }
}
