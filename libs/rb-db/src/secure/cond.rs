use sea_orm::{ColumnTrait, Condition, EntityTrait, sea_query::Expr};

use crate::secure::{AccessScope, ScopableEntity};
use rb_security::access_scope::{ScopeConstraint, ScopeFilter, ScopeValue};

pub(crate) fn scope_value_to_sea_value(v: &ScopeValue) -> sea_orm::Value {
    match v {
        ScopeValue::String(s) => sea_orm::Value::from(s.clone()),
        ScopeValue::Int(n) => sea_orm::Value::from(*n),
        ScopeValue::Bool(b) => sea_orm::Value::from(*b),
    }
}

/// `WHERE false`.
fn deny_all() -> Condition {
    Condition::all().add(Expr::value(false))
}

/// Compile an [`AccessScope`] into a `SeaORM` [`Condition`] for entity `E`.
///
/// Constraints are OR-ed, filters inside a constraint are AND-ed. A
/// constraint that names a property `E` cannot resolve is dropped; when every
/// constraint is dropped the result is deny-all.
pub fn build_scope_condition<E>(scope: &AccessScope) -> Condition
where
    E: ScopableEntity + EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    if scope.is_unconstrained() {
        return Condition::all();
    }
    if scope.is_deny_all() {
        return deny_all();
    }

    let compiled: Vec<Condition> = scope
        .constraints()
        .iter()
        .filter_map(build_constraint_condition::<E>)
        .collect();

    match compiled.len() {
        0 => deny_all(),
        1 => compiled.into_iter().next().unwrap_or_else(deny_all),
        _ => compiled.into_iter().fold(Condition::any(), Condition::add),
    }
}

fn build_constraint_condition<E>(constraint: &ScopeConstraint) -> Option<Condition>
where
    E: ScopableEntity + EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    let mut and_cond = Condition::all();
    for filter in constraint.filters() {
        let col = E::resolve_property(filter.property())?;
        and_cond = match filter {
            ScopeFilter::Eq(eq) => {
                and_cond.add(Expr::col(col).eq(scope_value_to_sea_value(eq.value())))
            }
            ScopeFilter::In(inf) => {
                let values: Vec<sea_orm::Value> =
                    inf.values().iter().map(scope_value_to_sea_value).collect();
                and_cond.add(Expr::col(col).is_in(values))
            }
        };
    }
    Some(and_cond)
}
