use std::marker::PhantomData;

use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::secure::cond::build_scope_condition;
use crate::secure::error::ScopeError;
use crate::secure::{AccessScope, DBRunner, DBRunnerInternal, ScopableEntity, SeaOrmRunner};

/// Typestate marker: no scope applied yet.
#[derive(Debug, Clone, Copy)]
pub struct Unscoped;

/// Typestate marker: a scope has been applied and the query may run.
#[derive(Debug, Clone, Copy)]
pub struct Scoped;

/// A `Select<E>` that cannot execute until it is scoped.
#[must_use]
#[derive(Clone, Debug)]
pub struct SecureSelect<E: EntityTrait, S> {
    pub(crate) inner: sea_orm::Select<E>,
    pub(crate) _state: PhantomData<S>,
}

/// Entry point: `Entity::find().secure()`.
pub trait SecureSelectExt<E: EntityTrait>: Sized {
    fn secure(self) -> SecureSelect<E, Unscoped>;
}

impl<E> SecureSelectExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
{
    fn secure(self) -> SecureSelect<E, Unscoped> {
        SecureSelect {
            inner: self,
            _state: PhantomData,
        }
    }
}

impl<E> SecureSelect<E, Unscoped>
where
    E: ScopableEntity + EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    /// Apply `scope` as a `WHERE` condition.
    pub fn scope_with(self, scope: &AccessScope) -> SecureSelect<E, Scoped> {
        let cond = build_scope_condition::<E>(scope);
        SecureSelect {
            inner: self.inner.filter(cond),
            _state: PhantomData,
        }
    }
}

impl<E> SecureSelect<E, Scoped>
where
    E: EntityTrait,
{
    /// # Errors
    /// Returns [`ScopeError::Db`] on query failure.
    pub async fn all(self, runner: &impl DBRunner) -> Result<Vec<E::Model>, ScopeError> {
        match DBRunnerInternal::as_seaorm(runner) {
            SeaOrmRunner::Conn(db) => Ok(self.inner.all(db).await?),
            SeaOrmRunner::Tx(tx) => Ok(self.inner.all(tx).await?),
        }
    }

    /// # Errors
    /// Returns [`ScopeError::Db`] on query failure.
    pub async fn one(self, runner: &impl DBRunner) -> Result<Option<E::Model>, ScopeError> {
        match DBRunnerInternal::as_seaorm(runner) {
            SeaOrmRunner::Conn(db) => Ok(self.inner.one(db).await?),
            SeaOrmRunner::Tx(tx) => Ok(self.inner.one(tx).await?),
        }
    }

    /// # Errors
    /// Returns [`ScopeError::Db`] on query failure.
    pub async fn count(self, runner: &impl DBRunner) -> Result<u64, ScopeError>
    where
        E::Model: sea_orm::FromQueryResult + Send + Sync,
    {
        match DBRunnerInternal::as_seaorm(runner) {
            SeaOrmRunner::Conn(db) => Ok(self.inner.count(db).await?),
            SeaOrmRunner::Tx(tx) => Ok(self.inner.count(tx).await?),
        }
    }

    pub fn filter(mut self, filter: sea_orm::Condition) -> Self {
        self.inner = QueryFilter::filter(self.inner, filter);
        self
    }

    pub fn order_by<C>(mut self, col: C, order: sea_orm::Order) -> Self
    where
        C: sea_orm::IntoSimpleExpr,
    {
        self.inner = QueryOrder::order_by(self.inner, col, order);
        self
    }

    /// `SELECT ... FOR UPDATE`. Backends without row locks (`SQLite`) ignore it.
    pub fn lock_exclusive(mut self) -> Self {
        self.inner = QuerySelect::lock_exclusive(self.inner);
        self
    }
}
