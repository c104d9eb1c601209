use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use std::marker::PhantomData;

use crate::secure::cond::build_scope_condition;
use crate::secure::error::ScopeError;
use crate::secure::{
    AccessScope, DBRunner, DBRunnerInternal, ScopableEntity, Scoped, SeaOrmRunner, Unscoped,
};
use rb_security::ScopeValue;

fn sea_value_to_scope_value(v: &sea_orm::Value) -> Option<ScopeValue> {
    match v {
        sea_orm::Value::String(Some(s)) => Some(ScopeValue::String((**s).clone())),
        sea_orm::Value::BigInt(Some(n)) => Some(ScopeValue::Int(*n)),
        sea_orm::Value::Int(Some(n)) => Some(ScopeValue::Int(i64::from(*n))),
        sea_orm::Value::SmallInt(Some(n)) => Some(ScopeValue::Int(i64::from(*n))),
        sea_orm::Value::Bool(Some(b)) => Some(ScopeValue::Bool(*b)),
        _ => None,
    }
}

/// Check that the values an `ActiveModel` is about to write satisfy `scope`.
///
/// At least one constraint must match entirely. Columns left `NotSet` are
/// skipped; a set column whose value is not listed by a filter fails that
/// constraint, as does a property the entity cannot resolve.
///
/// # Errors
/// Returns [`ScopeError::Denied`] when no constraint matches.
pub fn validate_insert_scope<A>(am: &A, scope: &AccessScope) -> Result<(), ScopeError>
where
    A: ActiveModelTrait,
    A::Entity: ScopableEntity + EntityTrait,
    <A::Entity as EntityTrait>::Column: ColumnTrait + Copy,
{
    if scope.is_unconstrained() || A::Entity::IS_UNRESTRICTED {
        return Ok(());
    }
    if scope.is_deny_all() {
        return Err(ScopeError::Denied("insert denied: scope has no constraints"));
    }

    'next_constraint: for constraint in scope.constraints() {
        for filter in constraint.filters() {
            let Some(col) = <A::Entity as ScopableEntity>::resolve_property(filter.property())
            else {
                continue 'next_constraint;
            };

            match am.get(col) {
                sea_orm::ActiveValue::NotSet => {}
                sea_orm::ActiveValue::Set(v) | sea_orm::ActiveValue::Unchanged(v) => {
                    let Some(sv) = sea_value_to_scope_value(&v) else {
                        continue 'next_constraint;
                    };
                    if !filter.values().contains(&sv) {
                        continue 'next_constraint;
                    }
                }
            }
        }
        return Ok(());
    }

    Err(ScopeError::Denied(
        "insert denied: row values do not satisfy any scope constraint",
    ))
}

/// Insert `am` after checking it against `scope`.
///
/// # Errors
/// Returns [`ScopeError::Denied`] when the row falls outside `scope`, or
/// [`ScopeError::Db`] when the insert fails.
pub async fn secure_insert<E>(
    am: E::ActiveModel,
    scope: &AccessScope,
    runner: &impl DBRunner,
) -> Result<E::Model, ScopeError>
where
    E: ScopableEntity + EntityTrait,
    E::Column: ColumnTrait + Copy,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    E::Model: sea_orm::IntoActiveModel<E::ActiveModel>,
{
    validate_insert_scope(&am, scope)?;

    match DBRunnerInternal::as_seaorm(runner) {
        SeaOrmRunner::Conn(db) => Ok(am.insert(db).await?),
        SeaOrmRunner::Tx(tx) => Ok(am.insert(tx).await?),
    }
}

/// An `UpdateMany<E>` that must be scoped before it runs.
#[derive(Clone, Debug)]
pub struct SecureUpdateMany<E: EntityTrait, S> {
    pub(crate) inner: sea_orm::UpdateMany<E>,
    pub(crate) _state: PhantomData<S>,
}

impl<E, S> SecureUpdateMany<E, S>
where
    E: ScopableEntity + EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    #[must_use]
    pub fn col_expr(mut self, col: E::Column, expr: sea_orm::sea_query::SimpleExpr) -> Self {
        self.inner = self.inner.col_expr(col, expr);
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: sea_orm::Condition) -> Self {
        self.inner = QueryFilter::filter(self.inner, filter);
        self
    }
}

pub trait SecureUpdateExt<E: EntityTrait>: Sized {
    fn secure(self) -> SecureUpdateMany<E, Unscoped>;
}

impl<E> SecureUpdateExt<E> for sea_orm::UpdateMany<E>
where
    E: EntityTrait,
{
    fn secure(self) -> SecureUpdateMany<E, Unscoped> {
        SecureUpdateMany {
            inner: self,
            _state: PhantomData,
        }
    }
}

impl<E> SecureUpdateMany<E, Unscoped>
where
    E: ScopableEntity + EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    #[must_use]
    pub fn scope_with(self, scope: &AccessScope) -> SecureUpdateMany<E, Scoped> {
        let cond = build_scope_condition::<E>(scope);
        SecureUpdateMany {
            inner: self.inner.filter(cond),
            _state: PhantomData,
        }
    }
}

impl<E> SecureUpdateMany<E, Scoped>
where
    E: EntityTrait,
{
    /// # Errors
    /// Returns [`ScopeError::Db`] on query failure.
    pub async fn exec(self, runner: &impl DBRunner) -> Result<sea_orm::UpdateResult, ScopeError> {
        match DBRunnerInternal::as_seaorm(runner) {
            SeaOrmRunner::Conn(db) => Ok(self.inner.exec(db).await?),
            SeaOrmRunner::Tx(tx) => Ok(self.inner.exec(tx).await?),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use rb_security::{ScopeConstraint, ScopeFilter, pep_properties};
    use sea_orm::Set;

    mod territory {
        use rb_security::pep_properties;
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "territories")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub region_code: String,
            pub departement_code: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}

        impl crate::secure::ScopableEntity for Entity {
            fn resolve_property(property: &str) -> Option<Column> {
                match property {
                    pep_properties::REGION_CODE => Some(Column::RegionCode),
                    pep_properties::DEPARTEMENT_CODE => Some(Column::DepartementCode),
                    _ => None,
                }
            }
        }
    }

    fn row(region: &str, departement: &str) -> territory::ActiveModel {
        territory::ActiveModel {
            region_code: Set(region.to_owned()),
            departement_code: Set(departement.to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn insert_inside_scope_is_accepted() {
        let scope = AccessScope::for_departements(["75", "92"]);
        assert!(validate_insert_scope(&row("11", "92"), &scope).is_ok());
    }

    #[test]
    fn insert_outside_scope_is_denied() {
        let scope = AccessScope::for_departements(["75", "92"]);
        let err = validate_insert_scope(&row("93", "13"), &scope).unwrap_err();
        assert!(matches!(err, ScopeError::Denied(_)));
    }

    #[test]
    fn deny_all_rejects_every_insert() {
        let err = validate_insert_scope(&row("11", "75"), &AccessScope::deny_all()).unwrap_err();
        assert!(matches!(err, ScopeError::Denied(_)));
    }

    #[test]
    fn allow_all_accepts_every_insert() {
        assert!(validate_insert_scope(&row("93", "13"), &AccessScope::allow_all()).is_ok());
    }

    #[test]
    fn unresolvable_property_fails_its_constraint() {
        let scope = AccessScope::from_constraints(vec![
            ScopeConstraint::new(vec![ScopeFilter::eq(pep_properties::CITY_CODE, "75056")]),
            ScopeConstraint::new(vec![ScopeFilter::eq(pep_properties::REGION_CODE, "11")]),
        ]);
        assert!(validate_insert_scope(&row("11", "75"), &scope).is_ok());
        assert!(validate_insert_scope(&row("93", "13"), &scope).is_err());
    }
}
