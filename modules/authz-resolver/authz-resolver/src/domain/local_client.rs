//! In-process [`AuthZResolverClient`] backed by the PDP service.

use std::sync::Arc;

use async_trait::async_trait;
use authz_resolver_sdk::{
    AuthZResolverClient, AuthZResolverError, EvaluationRequest, EvaluationResponse, RuleKey,
};

use super::Service;

pub struct AuthZResolverLocalClient {
    service: Arc<Service>,
}

impl AuthZResolverLocalClient {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AuthZResolverClient for AuthZResolverLocalClient {
    async fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluationResponse, AuthZResolverError> {
        let subject = request.subject.id;
        let key = RuleKey::new(request.subject.role, request.entity, request.feature);
        let target = request.target.clone();

        self.service.evaluate(request).await.map_err(|e| {
            tracing::error!(
                subject,
                rule = %key,
                target = ?target,
                error = %e,
                "policy evaluation failed"
            );
            AuthZResolverError::from(e)
        })
    }
}
