//! Scoped `SeaORM` access.
//!
//! Queries start unscoped and must be narrowed with an [`AccessScope`] before
//! they can run (typestate `Unscoped` to `Scoped`):
//!
//! ```rust,ignore
//! use rb_db::secure::{SecureSelectExt, ScopableEntity};
//!
//! let rows = organization::Entity::find()
//!     .secure()
//!     .scope_with(&scope)
//!     .all(&conn)
//!     .await?;
//! ```
//!
//! # Policy
//!
//! | Scope | Behavior |
//! |-------|----------|
//! | deny-all (default) | `WHERE false` |
//! | unconstrained | no filter |
//! | one constraint | AND of its filters |
//! | several constraints | OR of the AND groups |
//!
//! A constraint naming a property the entity cannot resolve is dropped; if
//! nothing is left the query is deny-all.

mod cond;
mod db;
mod db_ops;
#[allow(clippy::module_inception)]
mod entity_traits;
mod error;
mod runner;
mod select;
mod tx_config;

pub use cond::build_scope_condition;
pub use db::{Db, DbConn, DbTx};
pub use db_ops::{SecureUpdateExt, SecureUpdateMany, secure_insert, validate_insert_scope};
pub use entity_traits::ScopableEntity;
pub use error::ScopeError;
#[doc(hidden)]
pub use runner::DBRunner;
pub use select::{Scoped, SecureSelect, SecureSelectExt, Unscoped};
pub use tx_config::{TxConfig, TxIsolationLevel};

pub use rb_security::{
    AccessScope, EqScopeFilter, InScopeFilter, ScopeConstraint, ScopeFilter, ScopeValue,
    pep_properties,
};

pub(crate) use runner::{DBRunnerInternal, SeaOrmRunner};
