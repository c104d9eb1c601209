//! Policy enforcer: builds evaluation requests from a [`SecurityContext`],
//! calls the PDP and turns its answer into a [`Decision`] or an
//! [`AccessScope`].

use std::sync::Arc;

use rb_security::{AccessScope, GeoPointer, SecurityContext};

use crate::api::AuthZResolverClient;
use crate::error::AuthZResolverError;
use crate::models::{
    Decision, DenyReason, EntityKind, EvaluationRequest, EvaluationRequestContext, Feature,
    Subject,
};
use crate::pep::compiler::{ConstraintCompileError, compile_to_access_scope};

#[derive(Debug, thiserror::Error)]
pub enum EnforcerError {
    /// The context carries no authenticated subject.
    #[error("authentication required")]
    Unauthenticated,

    #[error("access denied by PDP")]
    Unauthorized { deny_reason: Option<DenyReason> },

    #[error("authorization evaluation failed: {0}")]
    EvaluationFailed(#[from] AuthZResolverError),

    #[error("constraint compilation failed: {0}")]
    CompileFailed(#[from] ConstraintCompileError),
}

impl EnforcerError {
    /// Terminal errors must be surfaced to the caller, never retried.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Unauthorized { .. })
    }

    /// Deny code when the PDP gave one.
    #[must_use]
    pub fn deny_code(&self) -> Option<&str> {
        match self {
            Self::Unauthorized {
                deny_reason: Some(r),
            } => Some(r.error_code.as_str()),
            _ => None,
        }
    }
}

/// Static descriptor of a protected entity kind.
///
/// `supported_properties` lists the columns the entity's storage can filter
/// on; constraints on anything else are dropped at compile time.
#[derive(Debug, Clone, Copy)]
pub struct ResourceType {
    pub entity: EntityKind,
    pub supported_properties: &'static [&'static str],
}

/// PEP object: one per consuming module, serves every resource type.
#[derive(Clone)]
pub struct PolicyEnforcer {
    authz: Arc<dyn AuthZResolverClient>,
}

impl PolicyEnforcer {
    #[must_use]
    pub fn new(authz: Arc<dyn AuthZResolverClient>) -> Self {
        Self { authz }
    }

    /// Build the PDP request for `ctx`.
    ///
    /// # Errors
    /// Returns [`EnforcerError::Unauthenticated`] for an anonymous context.
    pub fn build_request(
        ctx: &SecurityContext,
        resource: &ResourceType,
        feature: Feature,
        target: Option<&GeoPointer>,
        require_constraints: bool,
    ) -> Result<EvaluationRequest, EnforcerError> {
        let (Some(id), Some(role)) = (ctx.subject_id(), ctx.role()) else {
            return Err(EnforcerError::Unauthenticated);
        };

        Ok(EvaluationRequest {
            subject: Subject {
                id,
                role,
                organization_id: ctx.organization_id(),
                location: ctx.location().clone(),
            },
            entity: resource.entity,
            feature,
            target: target.cloned(),
            context: EvaluationRequestContext {
                require_constraints,
                supported_properties: resource
                    .supported_properties
                    .iter()
                    .map(|s| (*s).to_owned())
                    .collect(),
            },
        })
    }

    /// Ask whether `ctx` may perform `feature` on a `resource` located at
    /// `target`. A denial is returned as `Decision { allowed: false, .. }`.
    ///
    /// # Errors
    /// - `Unauthenticated` for an anonymous context
    /// - `EvaluationFailed` when the PDP cannot evaluate
    #[tracing::instrument(skip(self, ctx, target), fields(entity = %resource.entity, feature = %feature))]
    pub async fn authorize(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceType,
        feature: Feature,
        target: Option<&GeoPointer>,
    ) -> Result<Decision, EnforcerError> {
        let request = Self::build_request(ctx, resource, feature, target, false)?;
        let response = self.authz.evaluate(request).await?;
        if !response.decision {
            tracing::debug!(
                deny_reason = ?response.context.deny_reason,
                "access denied"
            );
        }
        Ok(Decision::from(response))
    }

    /// Like [`authorize`](Self::authorize) but turns a denial into an error.
    ///
    /// # Errors
    /// - `Unauthorized` when the PDP denies
    /// - see [`authorize`](Self::authorize)
    pub async fn require(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceType,
        feature: Feature,
        target: Option<&GeoPointer>,
    ) -> Result<Decision, EnforcerError> {
        let decision = self.authorize(ctx, resource, feature, target).await?;
        if decision.allowed {
            Ok(decision)
        } else {
            Err(EnforcerError::Unauthorized {
                deny_reason: decision.deny_reason,
            })
        }
    }

    /// Compile the principal's authority over `resource` into a list scope.
    ///
    /// # Errors
    /// - `Unauthenticated` for an anonymous context
    /// - `Unauthorized` when the PDP denies
    /// - `CompileFailed` when no constraint survives compilation
    /// - `EvaluationFailed` when the PDP cannot evaluate
    #[tracing::instrument(skip(self, ctx), fields(entity = %resource.entity, feature = %feature))]
    pub async fn access_scope(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceType,
        feature: Feature,
    ) -> Result<AccessScope, EnforcerError> {
        let request = Self::build_request(ctx, resource, feature, None, true)?;
        let response = self.authz.evaluate(request).await?;

        if !response.decision {
            tracing::debug!(
                deny_reason = ?response.context.deny_reason,
                "list access denied"
            );
            return Err(EnforcerError::Unauthorized {
                deny_reason: response.context.deny_reason,
            });
        }

        Ok(compile_to_access_scope(
            &response,
            true,
            resource.supported_properties,
        )?)
    }
}

impl std::fmt::Debug for PolicyEnforcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEnforcer").finish_non_exhaustive()
    }
}
