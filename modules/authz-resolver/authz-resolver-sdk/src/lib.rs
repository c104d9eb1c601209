#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `AuthZ` Resolver SDK
//!
//! This crate provides the public API for the `authz_resolver` module:
//!
//! - [`AuthZResolverClient`] - Public API trait for consumers
//! - [`EvaluationRequest`], [`EvaluationResponse`], [`Decision`] - Evaluation models
//! - [`PermissionRule`], [`RuleKey`] and the closed enums they are keyed by
//! - [`Constraint`], [`Predicate`] - Constraint types
//! - [`AuthZResolverError`] - Error types
//! - [`pep`] - PEP helpers ([`PolicyEnforcer`], [`ResourceType`], compiler)
//!
//! ## Usage
//!
//! ```ignore
//! use authz_resolver_sdk::{EntityKind, Feature, PolicyEnforcer, ResourceType};
//! use rb_security::pep_properties;
//!
//! const SHANTYTOWN: ResourceType = ResourceType {
//!     entity: EntityKind::Shantytown,
//!     supported_properties: pep_properties::GEOGRAPHIC,
//! };
//!
//! let enforcer = PolicyEnforcer::new(authz);
//!
//! // single object: is the town's city inside the principal's authority?
//! let decision = enforcer
//!     .require(&ctx, &SHANTYTOWN, Feature::Read, Some(&town_location))
//!     .await?;
//! if decision.can_see(DataFlag::DataJustice) { /* ... */ }
//!
//! // list: compile the authority into a WHERE clause
//! let scope = enforcer.access_scope(&ctx, &SHANTYTOWN, Feature::List).await?;
//! ```

pub mod api;
pub mod constraints;
pub mod error;
pub mod models;
pub mod pep;

pub use api::AuthZResolverClient;
pub use constraints::{Constraint, EqPredicate, InPredicate, Predicate};
pub use error::AuthZResolverError;
pub use models::{
    DataFlag, Decision, DenyReason, EntityKind, EvaluationRequest, EvaluationRequestContext,
    EvaluationResponse, EvaluationResponseContext, Feature, PermissionRule, RuleKey, RuleLevel,
    Subject, UnknownVariant, deny_codes,
};
pub use pep::{EnforcerError, IntoPropertyValue, PolicyEnforcer, ResourceType};
