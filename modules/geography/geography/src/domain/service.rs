//! Snapshot publication and scope resolution.

use std::sync::Arc;

use arc_swap::ArcSwap;
use geography_sdk::{Departement, GeoSnapshot, GeographyReader, ResolvedScope};
use rb_db::Db;
use rb_security::{GeoPointer, GeographicLevel};
use tokio::sync::Mutex;
use tracing::info;

use super::error::DomainError;
use super::resolver;
use crate::infra::storage::repo;

/// Holds the published [`GeoSnapshot`].
///
/// Readers load the current `Arc` without locking. Reloads are serialized by
/// `reload_lock` and publish a whole new snapshot in one swap, so a reader
/// never observes a half-loaded hierarchy.
pub struct Service {
    snapshot: ArcSwap<GeoSnapshot>,
    reload_lock: Mutex<()>,
}

impl Service {
    #[must_use]
    pub fn new(snapshot: GeoSnapshot) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(snapshot),
            reload_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<GeoSnapshot> {
        self.snapshot.load_full()
    }

    /// Resolve `pointer` against the current snapshot.
    ///
    /// # Errors
    /// Returns [`DomainError::DanglingReference`] when the pointer (or one of
    /// its ancestors) names a missing row.
    #[tracing::instrument(skip_all, fields(pointer = %pointer))]
    pub fn resolve_scope(&self, pointer: &GeoPointer) -> Result<ResolvedScope, DomainError> {
        let snapshot = self.snapshot.load();
        Ok(resolver::resolve_scope(snapshot.as_ref(), pointer)?)
    }

    /// # Errors
    /// Returns [`DomainError::DanglingReference`] for an unknown region.
    pub fn departements_in_region(&self, region_code: &str) -> Result<Vec<Departement>, DomainError> {
        let snapshot = self.snapshot.load();
        if snapshot.region(region_code).is_none() {
            return Err(DomainError::DanglingReference {
                pointer: GeographicLevel::Region,
                code: region_code.to_owned(),
            });
        }
        Ok(snapshot
            .departements_in_region(region_code)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Reload the hierarchy from the reference tables and publish it.
    ///
    /// # Errors
    /// Returns [`DomainError::Database`] when the tables cannot be read,
    /// [`DomainError::InvalidDataset`] when their content is inconsistent and
    /// [`DomainError::Unavailable`] when they are empty (migrations not run).
    #[tracing::instrument(skip_all)]
    pub async fn reload_from_db(&self, db: &Db) -> Result<Arc<GeoSnapshot>, DomainError> {
        let _guard = self.reload_lock.lock().await;
        let conn = db.conn()?;
        let dataset = repo::load_dataset(&conn).await?;
        let snapshot = GeoSnapshot::from_dataset(dataset)?;
        if snapshot.is_empty() {
            return Err(DomainError::Unavailable(
                "reference tables are empty; run migrations first".to_owned(),
            ));
        }
        Ok(self.publish(snapshot))
    }

    /// Publish `snapshot` in place of the current one.
    pub async fn replace(&self, snapshot: GeoSnapshot) -> Arc<GeoSnapshot> {
        let _guard = self.reload_lock.lock().await;
        self.publish(snapshot)
    }

    fn publish(&self, snapshot: GeoSnapshot) -> Arc<GeoSnapshot> {
        let (regions, departements, epcis, cities) = snapshot.counts();
        let snapshot = Arc::new(snapshot);
        self.snapshot.store(Arc::clone(&snapshot));
        info!(regions, departements, epcis, cities, "geography snapshot published");
        snapshot
    }
}
