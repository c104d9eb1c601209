#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod access_scope;
pub mod context;
pub mod geo;
pub mod role;

pub use access_scope::{
    AccessScope, EqScopeFilter, InScopeFilter, ScopeConstraint, ScopeFilter, ScopeValue,
    pep_properties,
};
pub use context::SecurityContext;
pub use geo::{GeoPointer, GeoPointerColumns, GeographicLevel, InvalidGeoScope};
pub use role::{Role, UnknownRole};
