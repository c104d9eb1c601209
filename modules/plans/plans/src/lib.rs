#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Plans module: plans and the départements they cover.
//!
//! All départements of one plan belong to the same region. The check runs
//! inside the write's serializable transaction, after the plan row is
//! locked, see [`domain::consistency::check_plan_territory_consistency`].

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::PlansConfig;
pub use domain::consistency::check_plan_territory_consistency;
pub use domain::error::DomainError;
pub use domain::model::{Plan, PlanTerritory};
pub use domain::service::{PLAN_RESOURCE, Service};
pub use infra::storage::Migrator;
pub use module::{MODULE_NAME, PlansModule};
