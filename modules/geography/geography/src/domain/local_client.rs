//! Local (in-process) client for the geography module.

use std::sync::Arc;

use async_trait::async_trait;
use geography_sdk::{Departement, GeoSnapshot, GeographyClient, GeographyError, ResolvedScope};
use rb_security::GeoPointer;

use super::{DomainError, Service};

pub struct GeographyLocalClient {
    svc: Arc<Service>,
}

impl GeographyLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> GeographyError {
    tracing::error!(operation = op, error = ?e, "geography call failed");
    e.into()
}

#[async_trait]
impl GeographyClient for GeographyLocalClient {
    async fn resolve_scope(&self, pointer: &GeoPointer) -> Result<ResolvedScope, GeographyError> {
        self.svc
            .resolve_scope(pointer)
            .map_err(|e| log_and_convert("resolve_scope", e))
    }

    async fn departements_in_region(
        &self,
        region_code: &str,
    ) -> Result<Vec<Departement>, GeographyError> {
        self.svc
            .departements_in_region(region_code)
            .map_err(|e| log_and_convert("departements_in_region", e))
    }

    fn snapshot(&self) -> Arc<GeoSnapshot> {
        self.svc.snapshot()
    }
}
