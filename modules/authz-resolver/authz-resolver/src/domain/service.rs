//! Policy decision point.

use std::sync::Arc;

use arc_swap::ArcSwap;
use authz_resolver_sdk::{
    Constraint, DenyReason, EqPredicate, EvaluationRequest, EvaluationResponse,
    EvaluationResponseContext, InPredicate, PermissionRule, Predicate, RuleKey, RuleLevel,
    deny_codes,
};
use geography_sdk::{GeographyClient, ResolvedScope};
use rb_security::{GeographicLevel, pep_properties};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::error::DomainError;
use super::matrix::PermissionMatrix;
use crate::config::LocalAnchor;

/// Evaluates requests against the published [`PermissionMatrix`].
///
/// The matrix is read lock-free; amendments are serialized by `amend_lock`
/// and publish a whole new matrix.
pub struct Service {
    geography: Arc<dyn GeographyClient>,
    matrix: ArcSwap<PermissionMatrix>,
    amend_lock: Mutex<()>,
    local_anchor: LocalAnchor,
}

impl Service {
    #[must_use]
    pub fn new(
        geography: Arc<dyn GeographyClient>,
        matrix: PermissionMatrix,
        local_anchor: LocalAnchor,
    ) -> Self {
        Self {
            geography,
            matrix: ArcSwap::from_pointee(matrix),
            amend_lock: Mutex::new(()),
            local_anchor,
        }
    }

    #[must_use]
    pub fn matrix(&self) -> Arc<PermissionMatrix> {
        self.matrix.load_full()
    }

    /// Evaluate a request.
    ///
    /// Denials are `Ok` responses with `decision == false` and a deny code.
    ///
    /// # Errors
    /// Returns [`DomainError::Geography`] when the principal's or the
    /// target's pointer cannot be resolved.
    #[tracing::instrument(
        skip_all,
        fields(
            subject = request.subject.id,
            role = %request.subject.role,
            entity = %request.entity,
            feature = %request.feature,
        )
    )]
    pub async fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluationResponse, DomainError> {
        let principal = self
            .geography
            .resolve_scope(&request.subject.location)
            .await?;

        let rule = self
            .matrix
            .load()
            .find_rule(
                request.subject.role,
                request.entity,
                request.feature,
                request.subject.organization_id,
            )
            .cloned();
        let Some(rule) = rule else {
            return Ok(deny(deny_codes::NO_MATCHING_RULE, "no rule for role, entity and feature"));
        };
        if !rule.allowed {
            return Ok(deny(deny_codes::RULE_DENIES, "rule denies this feature"));
        }

        let Some(authority) = self.authority_scope(&principal, rule.geographic_level) else {
            return Ok(deny(
                deny_codes::SCOPE_NOT_APPLICABLE,
                format!(
                    "principal at {} cannot act at {} level",
                    principal.level, rule.geographic_level
                ),
            ));
        };

        if let Some(target) = &request.target {
            let target_scope = self.geography.resolve_scope(target).await?;
            if !authority.contains(&target_scope) {
                return Ok(deny(
                    deny_codes::OUT_OF_SCOPE,
                    format!("{target} is outside {}", authority.pointer()),
                ));
            }
        }

        let constraints = if request.context.require_constraints {
            vec![self.constraint_for(&authority).await?]
        } else {
            Vec::new()
        };

        debug!(authority = %authority.pointer(), "access granted");
        Ok(EvaluationResponse {
            decision: true,
            context: EvaluationResponseContext {
                constraints,
                deny_reason: None,
                data_flags: rule.data_flags,
            },
        })
    }

    /// The scope a rule grants to `principal`, `None` when the rule cannot
    /// apply (principal broader than a fixed level, or the ancestor at that
    /// level does not exist).
    #[must_use]
    pub fn authority_scope(
        &self,
        principal: &ResolvedScope,
        level: RuleLevel,
    ) -> Option<ResolvedScope> {
        match level.fixed() {
            Some(fixed) => principal.widen_to(fixed),
            None => self.local_anchor.anchor(principal),
        }
    }

    async fn constraint_for(&self, authority: &ResolvedScope) -> Result<Constraint, DomainError> {
        let eq = |property: &str, code: Option<&str>| -> Result<Constraint, DomainError> {
            let code = code.ok_or_else(|| {
                DomainError::Internal(format!("{} scope without its code", authority.level))
            })?;
            Ok(Constraint::single(Predicate::Eq(EqPredicate::new(
                property, code,
            ))))
        };

        match authority.level {
            GeographicLevel::Nation => Ok(Constraint::unrestricted()),
            GeographicLevel::Region => {
                let region = authority.region_code().ok_or_else(|| {
                    DomainError::Internal("region scope without its code".to_owned())
                })?;
                let departements = self.geography.departements_in_region(region).await?;
                Ok(Constraint::single(Predicate::In(InPredicate::new(
                    pep_properties::DEPARTEMENT_CODE,
                    departements.into_iter().map(|d| d.code),
                ))))
            }
            GeographicLevel::Departement => {
                eq(pep_properties::DEPARTEMENT_CODE, authority.departement_code())
            }
            GeographicLevel::Epci => eq(pep_properties::EPCI_CODE, authority.epci_code()),
            GeographicLevel::City => eq(pep_properties::CITY_CODE, authority.city_code()),
        }
    }

    /// Add a rule (role default or organization override) and publish the
    /// amended matrix. Administrative operation only.
    ///
    /// # Errors
    /// Returns [`DomainError::Matrix`] when the key already has a rule.
    #[tracing::instrument(skip(self, rule), fields(key = %key))]
    pub async fn amend_rule(
        &self,
        organization_id: Option<i64>,
        key: RuleKey,
        rule: PermissionRule,
    ) -> Result<(), DomainError> {
        let _guard = self.amend_lock.lock().await;
        let mut builder = self.matrix.load().to_builder();
        builder.add(organization_id, key, rule)?;
        let matrix = builder.build();
        let rules = matrix.len();
        self.matrix.store(Arc::new(matrix));
        info!(?organization_id, rules, "permission matrix amended");
        Ok(())
    }
}

fn deny(code: &str, details: impl Into<String>) -> EvaluationResponse {
    let reason = DenyReason::new(code, details);
    debug!(code, details = ?reason.details, "access denied");
    EvaluationResponse::deny(reason)
}
