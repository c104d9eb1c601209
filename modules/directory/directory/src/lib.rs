#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Directory module: organizations and their users.
//!
//! An organization carries the geo pointer its users inherit. Every write of
//! that pointer goes through the geo-consistency check and is resolved
//! against the published geography before it reaches storage, so the
//! security contexts built here never carry an inconsistent location.

pub mod domain;
pub mod infra;
pub mod module;

pub use domain::error::DomainError;
pub use domain::model::{NewUser, Organization, User};
pub use domain::service::Service;
pub use infra::storage::Migrator;
pub use infra::storage::sea_orm_repo::SeaOrmDirectoryRepository;
pub use module::{DirectoryModule, DirectoryService, MODULE_NAME};
