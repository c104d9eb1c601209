//! Public API trait for the geography module.

use std::sync::Arc;

use async_trait::async_trait;
use rb_security::GeoPointer;

use crate::error::GeographyError;
use crate::models::{Departement, ResolvedScope};
use crate::snapshot::GeoSnapshot;

/// Geography gateway consumed by the authorization gate and by modules that
/// need to place rows in the hierarchy.
///
/// ```ignore
/// let scope = geography.resolve_scope(ctx.location()).await?;
/// ```
#[async_trait]
pub trait GeographyClient: Send + Sync {
    /// Resolve a principal's pointer to its full scope.
    ///
    /// # Errors
    ///
    /// - `DanglingReference` when the pointer names a missing row
    async fn resolve_scope(&self, pointer: &GeoPointer) -> Result<ResolvedScope, GeographyError>;

    /// Départements of a region, ordered by code.
    ///
    /// # Errors
    ///
    /// - `DanglingReference` when the region is unknown
    async fn departements_in_region(
        &self,
        region_code: &str,
    ) -> Result<Vec<Departement>, GeographyError>;

    /// The snapshot currently published.
    fn snapshot(&self) -> Arc<GeoSnapshot>;
}
