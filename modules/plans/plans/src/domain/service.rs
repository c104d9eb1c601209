use std::sync::Arc;

use authz_resolver_sdk::{EntityKind, Feature, PolicyEnforcer, ResourceType};
use geography_sdk::GeographyClient;
use rb_db::{Db, TxConfig};
use rb_security::{AccessScope, GeoPointer, SecurityContext, pep_properties};
use tracing::{debug, info};

use super::consistency::check_plan_territory_consistency;
use super::error::DomainError;
use super::model::{Plan, PlanTerritory};
use crate::config::PlansConfig;
use crate::infra::storage::repo;

/// Plans are filtered through their territory rows, which only know their
/// département and region.
pub const PLAN_RESOURCE: ResourceType = ResourceType {
    entity: EntityKind::Plan,
    supported_properties: &[pep_properties::REGION_CODE, pep_properties::DEPARTEMENT_CODE],
};

pub struct Service {
    db: Db,
    geography: Arc<dyn GeographyClient>,
    policy_enforcer: PolicyEnforcer,
    config: PlansConfig,
}

impl Service {
    #[must_use]
    pub fn new(
        db: Db,
        geography: Arc<dyn GeographyClient>,
        policy_enforcer: PolicyEnforcer,
        config: PlansConfig,
    ) -> Self {
        Self {
            db,
            geography,
            policy_enforcer,
            config,
        }
    }

    /// # Errors
    /// `Validation` for an empty or oversized name.
    pub async fn create_plan(&self, name: &str) -> Result<Plan, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "must not be empty"));
        }
        if name.chars().count() > self.config.max_name_length {
            return Err(DomainError::validation(
                "name",
                format!("must be at most {} characters", self.config.max_name_length),
            ));
        }

        let conn = self.db.conn()?;
        let plan = repo::insert_plan(&conn, name).await?;
        info!(plan_id = plan.id, "plan created");
        Ok(plan)
    }

    /// Attach départements to a plan in one serializable transaction.
    ///
    /// Départements the plan already covers are skipped. The first one that
    /// breaks the single-region invariant rolls the whole batch back.
    /// Returns the rows written by this call.
    ///
    /// # Errors
    /// - `PlanNotFound`
    /// - `RegionMismatch` on the first département of another region
    /// - `Geography(DanglingReference)` for an unknown département
    /// - `Database` when a concurrent writer makes the transaction fail
    #[tracing::instrument(skip(self, codes), fields(count = codes.len()))]
    pub async fn attach_departements(
        &self,
        plan_id: i64,
        codes: &[String],
    ) -> Result<Vec<PlanTerritory>, DomainError> {
        if codes.len() > self.config.max_batch_size {
            return Err(DomainError::validation(
                "departements",
                format!("at most {} per call", self.config.max_batch_size),
            ));
        }

        let geography = self.geography.snapshot();
        let codes = codes.to_vec();
        let attached = self
            .db
            .transaction_with_config(TxConfig::serializable(), move |tx| {
                Box::pin(async move {
                    repo::find_plan(tx, plan_id, true).await?;
                    let mut covered: Vec<String> = repo::territories_of(tx, plan_id)
                        .await?
                        .into_iter()
                        .map(|t| t.departement_code)
                        .collect();

                    let mut attached = Vec::new();
                    for code in codes {
                        if covered.contains(&code) {
                            debug!(plan_id, departement_code = %code, "already attached");
                            continue;
                        }
                        let region = check_plan_territory_consistency(
                            tx,
                            &*geography,
                            plan_id,
                            &code,
                            None,
                        )
                        .await?;
                        attached.push(repo::insert_territory(tx, plan_id, &code, &region).await?);
                        covered.push(code);
                    }
                    Ok::<_, DomainError>(attached)
                })
            })
            .await?;

        info!(plan_id, attached = attached.len(), "departements attached");
        Ok(attached)
    }

    /// Attach the départements the given managers are assigned to.
    ///
    /// Managers at département, EPCI or city level contribute their
    /// département; duplicates collapse.
    ///
    /// # Errors
    /// - `Validation` when a manager sits above département level
    /// - `Geography(DanglingReference)` for a pointer naming a missing row
    /// - see [`Service::attach_departements`]
    pub async fn attach_from_managers(
        &self,
        plan_id: i64,
        managers: &[GeoPointer],
    ) -> Result<Vec<PlanTerritory>, DomainError> {
        let mut codes: Vec<String> = Vec::new();
        for pointer in managers {
            let scope = self.geography.resolve_scope(pointer).await?;
            let Some(code) = scope.departement_code() else {
                return Err(DomainError::validation(
                    "managers",
                    format!("manager at {pointer} has no departement"),
                ));
            };
            if !codes.iter().any(|c| c == code) {
                codes.push(code.to_owned());
            }
        }
        self.attach_departements(plan_id, &codes).await
    }

    /// Replace the `from` département of a plan by `to`.
    ///
    /// The `from` row is left out of the region check, so a plan covering
    /// only `from` may move to another region.
    ///
    /// # Errors
    /// - `TerritoryNotAttached` when the plan does not cover `from`
    /// - `Conflict` when it already covers `to`
    /// - `RegionMismatch`, `PlanNotFound`, `Geography` as for attaching
    #[tracing::instrument(skip(self))]
    pub async fn move_territory(
        &self,
        plan_id: i64,
        from: &str,
        to: &str,
    ) -> Result<PlanTerritory, DomainError> {
        let geography = self.geography.snapshot();
        let (from, to) = (from.to_owned(), to.to_owned());
        let moved = self
            .db
            .transaction_with_config(TxConfig::serializable(), move |tx| {
                Box::pin(async move {
                    repo::find_plan(tx, plan_id, true).await?;
                    let covered = repo::territories_of(tx, plan_id).await?;
                    if !covered.iter().any(|t| t.departement_code == from) {
                        return Err(DomainError::TerritoryNotAttached {
                            plan_id,
                            departement_code: from,
                        });
                    }
                    if from != to && covered.iter().any(|t| t.departement_code == to) {
                        return Err(DomainError::Conflict(format!(
                            "plan {plan_id} already covers departement '{to}'"
                        )));
                    }

                    let region = check_plan_territory_consistency(
                        tx,
                        &*geography,
                        plan_id,
                        &to,
                        Some(&from),
                    )
                    .await?;
                    if !repo::retarget_territory(tx, plan_id, &from, &to, &region).await? {
                        return Err(DomainError::TerritoryNotAttached {
                            plan_id,
                            departement_code: from,
                        });
                    }
                    Ok::<_, DomainError>(PlanTerritory {
                        plan_id,
                        departement_code: to,
                        region_code: region,
                    })
                })
            })
            .await?;

        info!(plan_id, departement_code = %moved.departement_code, "territory moved");
        Ok(moved)
    }

    /// # Errors
    /// `PlanNotFound`.
    pub async fn list_territories(&self, plan_id: i64) -> Result<Vec<PlanTerritory>, DomainError> {
        let conn = self.db.conn()?;
        repo::find_plan(&conn, plan_id, false).await?;
        repo::territories_of(&conn, plan_id).await
    }

    /// Plans with at least one territory inside `scope`.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn list_plans(&self, scope: &AccessScope) -> Result<Vec<Plan>, DomainError> {
        let conn = self.db.conn()?;
        repo::list_plans(&conn, scope).await
    }

    /// Plans `ctx` may list.
    ///
    /// # Errors
    /// - `Unauthenticated` for an anonymous context
    /// - `Forbidden` when the matrix denies listing plans, or when the
    ///   principal's authority cannot be expressed over plan territories
    #[tracing::instrument(skip_all, fields(subject_id = ?ctx.subject_id()))]
    pub async fn list_plans_for(&self, ctx: &SecurityContext) -> Result<Vec<Plan>, DomainError> {
        let scope = self
            .policy_enforcer
            .access_scope(ctx, &PLAN_RESOURCE, Feature::List)
            .await?;
        self.list_plans(&scope).await
    }
}
