#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Geography SDK
//!
//! Public surface of the `geography` module:
//!
//! - [`Region`], [`Departement`], [`Epci`], [`City`] - reference rows
//! - [`GeoSnapshot`] - immutable, validated view of the whole hierarchy
//! - [`GeographyReader`] - lookups the scope resolver consumes
//! - [`ResolvedScope`] - a principal's scope with every ancestor filled in
//! - [`GeographyClient`] - async API registered by the module
//! - [`GeographyError`] - error type
//!
//! ## Usage
//!
//! ```ignore
//! use geography_sdk::GeographyClient;
//! use rb_security::GeoPointer;
//!
//! let scope = geography.resolve_scope(&GeoPointer::City("75056".to_owned())).await?;
//! assert_eq!(scope.region_code(), Some("11"));
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod snapshot;

pub use api::GeographyClient;
pub use error::GeographyError;
pub use models::{
    Centroid, City, DEFAULT_CENTROID, Departement, Epci, Region, ResolvedScope, contains_scope,
};
pub use snapshot::{GeoDataset, GeoSnapshot, GeoSnapshotBuilder, GeographyReader};
