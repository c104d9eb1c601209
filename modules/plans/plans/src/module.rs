use std::sync::Arc;

use authz_resolver_sdk::PolicyEnforcer;
use geography_sdk::GeographyClient;
use rb_db::Db;
use tracing::info;

use crate::config::PlansConfig;
use crate::domain::service::Service;

pub const MODULE_NAME: &str = "plans";

#[derive(Clone)]
pub struct PlansModule {
    service: Arc<Service>,
}

impl PlansModule {
    #[must_use]
    pub fn new(
        db: &Db,
        geography: Arc<dyn GeographyClient>,
        policy_enforcer: PolicyEnforcer,
        cfg: &PlansConfig,
    ) -> Self {
        info!(
            max_batch_size = cfg.max_batch_size,
            "Initializing {MODULE_NAME} module"
        );
        let service = Arc::new(Service::new(
            db.clone(),
            geography,
            policy_enforcer,
            cfg.clone(),
        ));
        Self { service }
    }

    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }
}
