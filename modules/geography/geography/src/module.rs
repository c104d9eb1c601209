use std::sync::Arc;

use anyhow::Context;
use geography_sdk::{GeoDataset, GeoSnapshot, GeographyClient};
use rb_db::Db;
use tracing::info;

use crate::config::{GeographyConfig, SnapshotSource};
use crate::domain::local_client::GeographyLocalClient;
use crate::domain::service::Service;

pub const MODULE_NAME: &str = "geography";

/// Wires the geography service and its in-process client.
#[derive(Clone)]
pub struct GeographyModule {
    service: Arc<Service>,
    client: Arc<dyn GeographyClient>,
}

impl GeographyModule {
    /// Load the snapshot from the configured source and publish it.
    ///
    /// # Errors
    /// Fails when the source cannot be read or its content is inconsistent.
    pub async fn init(db: &Db, cfg: &GeographyConfig) -> anyhow::Result<Self> {
        info!(source = ?cfg.source, "Initializing geography module");

        let service = Arc::new(Service::new(GeoSnapshot::default()));
        match cfg.source {
            SnapshotSource::Database => {
                service
                    .reload_from_db(db)
                    .await
                    .context("failed to load geography from the reference tables")?;
            }
            SnapshotSource::Embedded => {
                service.replace(crate::embedded_snapshot()?).await;
            }
            SnapshotSource::File => {
                let path = cfg
                    .dataset_path
                    .as_ref()
                    .context("geography.dataset_path is required when source is 'file'")?;
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let snapshot = GeoSnapshot::from_dataset(GeoDataset::from_json(&raw)?)?;
                service.replace(snapshot).await;
            }
        }

        Ok(Self::from_service(service))
    }

    /// Wrap an already published service (tests, embedding).
    #[must_use]
    pub fn from_service(service: Arc<Service>) -> Self {
        let client: Arc<dyn GeographyClient> =
            Arc::new(GeographyLocalClient::new(Arc::clone(&service)));
        Self { service, client }
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn GeographyClient> {
        Arc::clone(&self.client)
    }

    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }
}
