//! Queries over `plans` and `plan_territories`.
//!
//! Plans are administrative rows: lookups are scoped on the row id, lists on
//! whatever scope the caller compiled.

use rb_db::secure::{
    DBRunner, ScopeConstraint, ScopeFilter, ScopeValue, SecureSelectExt, SecureUpdateExt,
    pep_properties, secure_insert,
};
use rb_security::AccessScope;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue, ColumnTrait, Condition, EntityTrait, Order};

use crate::domain::error::DomainError;
use crate::domain::model::{Plan, PlanTerritory};

use super::entity::{plan, plan_territory};

fn by_id(id: i32) -> AccessScope {
    AccessScope::single(ScopeConstraint::new(vec![ScopeFilter::eq(
        pep_properties::RESOURCE_ID,
        i64::from(id),
    )]))
}

/// Storage id of a plan. Ids that cannot exist are reported as missing.
fn plan_row_id(plan_id: i64) -> Result<i32, DomainError> {
    i32::try_from(plan_id).map_err(|_| DomainError::PlanNotFound(plan_id))
}

fn of_plan(plan_id: i32) -> Condition {
    Condition::all().add(plan_territory::Column::PlanId.eq(plan_id))
}

/// # Errors
/// Storage failures.
pub async fn insert_plan(runner: &impl DBRunner, name: &str) -> Result<Plan, DomainError> {
    let am = plan::ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name.to_owned()),
    };
    let model = secure_insert::<plan::Entity>(am, &AccessScope::allow_all(), runner).await?;
    Ok(model.into())
}

/// Fetch a plan, taking a row lock on it when `lock` is set and the backend
/// supports `SELECT ... FOR UPDATE`.
///
/// # Errors
/// `PlanNotFound` when the plan does not exist.
pub async fn find_plan(
    runner: &impl DBRunner,
    plan_id: i64,
    lock: bool,
) -> Result<Plan, DomainError> {
    let mut query = plan::Entity::find()
        .secure()
        .scope_with(&by_id(plan_row_id(plan_id)?));
    if lock {
        query = query.lock_exclusive();
    }
    query
        .one(runner)
        .await?
        .map(Plan::from)
        .ok_or(DomainError::PlanNotFound(plan_id))
}

/// Plans with at least one territory inside `scope`, ordered by id. An
/// unconstrained scope also returns plans without territories.
///
/// # Errors
/// Storage failures.
pub async fn list_plans(
    runner: &impl DBRunner,
    scope: &AccessScope,
) -> Result<Vec<Plan>, DomainError> {
    let plans_scope = if scope.is_unconstrained() {
        AccessScope::allow_all()
    } else {
        let mut ids: Vec<i64> = list_territories(runner, scope)
            .await?
            .into_iter()
            .map(|t| t.plan_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        AccessScope::single(ScopeConstraint::new(vec![ScopeFilter::r#in(
            pep_properties::RESOURCE_ID,
            ids.into_iter().map(ScopeValue::Int).collect(),
        )]))
    };

    Ok(plan::Entity::find()
        .secure()
        .scope_with(&plans_scope)
        .order_by(plan::Column::Id, Order::Asc)
        .all(runner)
        .await?
        .into_iter()
        .map(Plan::from)
        .collect())
}

/// Territory rows inside `scope`, ordered by plan then département.
///
/// # Errors
/// Storage failures.
pub async fn list_territories(
    runner: &impl DBRunner,
    scope: &AccessScope,
) -> Result<Vec<PlanTerritory>, DomainError> {
    Ok(plan_territory::Entity::find()
        .secure()
        .scope_with(scope)
        .order_by(plan_territory::Column::PlanId, Order::Asc)
        .order_by(plan_territory::Column::DepartementCode, Order::Asc)
        .all(runner)
        .await?
        .into_iter()
        .map(PlanTerritory::from)
        .collect())
}

/// Every territory of one plan, ordered by département code.
///
/// # Errors
/// Storage failures.
pub async fn territories_of(
    runner: &impl DBRunner,
    plan_id: i64,
) -> Result<Vec<PlanTerritory>, DomainError> {
    Ok(plan_territory::Entity::find()
        .secure()
        .scope_with(&AccessScope::allow_all())
        .filter(of_plan(plan_row_id(plan_id)?))
        .order_by(plan_territory::Column::DepartementCode, Order::Asc)
        .all(runner)
        .await?
        .into_iter()
        .map(PlanTerritory::from)
        .collect())
}

/// # Errors
/// `Conflict` when the plan already covers the département.
pub async fn insert_territory(
    runner: &impl DBRunner,
    plan_id: i64,
    departement_code: &str,
    region_code: &str,
) -> Result<PlanTerritory, DomainError> {
    let am = plan_territory::ActiveModel {
        id: ActiveValue::NotSet,
        plan_id: ActiveValue::Set(plan_row_id(plan_id)?),
        departement_code: ActiveValue::Set(departement_code.to_owned()),
        region_code: ActiveValue::Set(region_code.to_owned()),
    };
    let model =
        secure_insert::<plan_territory::Entity>(am, &AccessScope::allow_all(), runner).await?;
    Ok(model.into())
}

/// Point the `from` row of a plan at another département.
///
/// Returns `false` when the plan has no `from` row.
///
/// # Errors
/// `Conflict` when the plan already covers `to`.
pub async fn retarget_territory(
    runner: &impl DBRunner,
    plan_id: i64,
    from: &str,
    to: &str,
    region_code: &str,
) -> Result<bool, DomainError> {
    let result = plan_territory::Entity::update_many()
        .secure()
        .scope_with(&AccessScope::allow_all())
        .filter(
            of_plan(plan_row_id(plan_id)?)
                .add(plan_territory::Column::DepartementCode.eq(from)),
        )
        .col_expr(plan_territory::Column::DepartementCode, Expr::value(to))
        .col_expr(plan_territory::Column::RegionCode, Expr::value(region_code))
        .exec(runner)
        .await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use rb_db::migration_runner::run_migrations;
    use rb_db::{ConnectOpts, connect_db};

    use super::*;
    use crate::infra::storage::Migrator;

    #[tokio::test]
    async fn retarget_reports_missing_row() {
        let opts = ConnectOpts {
            max_conns: Some(1),
            min_conns: Some(1),
            ..Default::default()
        };
        let db = connect_db("sqlite::memory:", opts).await.unwrap();
        run_migrations::<Migrator>(&db, "plans").await.unwrap();
        let conn = db.conn().unwrap();
        let plan = insert_plan(&conn, "Plan IdF").await.unwrap();
        insert_territory(&conn, plan.id, "75", "11").await.unwrap();

        assert!(!retarget_territory(&conn, plan.id, "94", "93", "11").await.unwrap());
        assert!(retarget_territory(&conn, plan.id, "75", "92", "11").await.unwrap());

        let rows = territories_of(&conn, plan.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].departement_code, "92");
    }
}
