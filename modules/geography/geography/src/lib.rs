#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Geography module: stores the region / département / EPCI / city
//! hierarchy, publishes it as an immutable [`geography_sdk::GeoSnapshot`] and
//! resolves principals' pointers into scopes.

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::{GeographyConfig, SnapshotSource};
pub use domain::local_client::GeographyLocalClient;
pub use domain::resolver::resolve_scope;
pub use domain::service::Service;
pub use infra::storage::migrations::Migrator;
pub use module::{GeographyModule, MODULE_NAME};

/// Reference dataset compiled into the binary. Seeded by the migrations and
/// used directly with [`SnapshotSource::Embedded`].
pub const EMBEDDED_DATASET: &str = include_str!("../data/geography.json");

/// Parse and validate [`EMBEDDED_DATASET`].
///
/// # Errors
/// Returns [`geography_sdk::GeographyError::InvalidDataset`] when the
/// embedded file is malformed.
pub fn embedded_snapshot() -> Result<geography_sdk::GeoSnapshot, geography_sdk::GeographyError> {
    geography_sdk::GeoSnapshot::from_dataset(geography_sdk::GeoDataset::from_json(
        EMBEDDED_DATASET,
    )?)
}
