//! `AuthZ` Resolver Module
//!
//! The policy decision point: resolves the principal's geography, looks up
//! the permission rule for its role, computes the authority scope the rule
//! grants and either checks a target against it or turns it into list
//! constraints.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::{AuthZResolverConfig, LocalAnchor, RuleOverride};
pub use domain::matrix::{MatrixError, PermissionMatrix, PermissionMatrixBuilder, default_matrix};
pub use domain::{AuthZResolverLocalClient, DomainError, Service};
pub use module::{AuthZResolverModule, MODULE_NAME};
