//! `AuthZ` resolver module.

use std::sync::Arc;

use anyhow::Context;
use authz_resolver_sdk::{AuthZResolverClient, PolicyEnforcer};
use geography_sdk::GeographyClient;
use tracing::info;

use crate::config::AuthZResolverConfig;
use crate::domain::matrix::default_matrix;
use crate::domain::{AuthZResolverLocalClient, Service};

pub const MODULE_NAME: &str = "authz-resolver";

/// Wires the PDP service, its in-process client and a ready enforcer.
#[derive(Clone)]
pub struct AuthZResolverModule {
    service: Arc<Service>,
    client: Arc<dyn AuthZResolverClient>,
}

impl AuthZResolverModule {
    /// Seed the default matrix, merge configured overrides and start the PDP.
    ///
    /// # Errors
    /// Fails when a configured rule duplicates an existing key.
    #[tracing::instrument(skip_all, fields(local_anchor = ?cfg.local_anchor))]
    pub fn init(
        geography: Arc<dyn GeographyClient>,
        cfg: &AuthZResolverConfig,
    ) -> anyhow::Result<Self> {
        info!("Initializing {MODULE_NAME} module");

        let mut builder = default_matrix()
            .context("default permission matrix is inconsistent")?
            .to_builder();
        for o in &cfg.overrides {
            builder
                .add(o.organization_id, o.key(), o.rule())
                .context("invalid authz.overrides entry")?;
        }
        let matrix = builder.build();
        info!(rules = matrix.len(), overrides = cfg.overrides.len(), "permission matrix loaded");

        let service = Arc::new(Service::new(geography, matrix, cfg.local_anchor));
        let client: Arc<dyn AuthZResolverClient> =
            Arc::new(AuthZResolverLocalClient::new(Arc::clone(&service)));

        info!("{MODULE_NAME} module initialized successfully");
        Ok(Self { service, client })
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn AuthZResolverClient> {
        Arc::clone(&self.client)
    }

    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }

    #[must_use]
    pub fn enforcer(&self) -> PolicyEnforcer {
        PolicyEnforcer::new(self.client())
    }
}
