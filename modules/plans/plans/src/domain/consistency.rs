//! Single-region invariant of plan territories.

use geography_sdk::{GeographyError, GeographyReader};
use rb_db::secure::DBRunner;
use rb_security::GeographicLevel;
use tracing::debug;

use super::error::DomainError;
use crate::infra::storage::repo;

/// Check that attaching `departement_code` to `plan_id` keeps every
/// département of the plan in one region.
///
/// `replacing` names the département whose row is being rewritten; that row
/// is left out of the comparison. A plan without other rows accepts any
/// département. Meant to run inside the write's transaction, after the plan
/// row has been locked, so that `conn` sees the rows the write will commit
/// against.
///
/// Returns the region of `departement_code`.
///
/// # Errors
/// - `Geography(DanglingReference)` when a département is unknown
/// - `RegionMismatch` when an existing row lies in another region
pub async fn check_plan_territory_consistency(
    conn: &impl DBRunner,
    geography: &dyn GeographyReader,
    plan_id: i64,
    departement_code: &str,
    replacing: Option<&str>,
) -> Result<String, DomainError> {
    let found_region = region_of(geography, departement_code)?;

    let existing = repo::territories_of(conn, plan_id).await?;
    for row in existing
        .iter()
        .filter(|t| Some(t.departement_code.as_str()) != replacing)
    {
        let expected_region = region_of(geography, &row.departement_code)?;
        if expected_region != found_region {
            debug!(
                plan_id,
                departement_code,
                %expected_region,
                %found_region,
                "plan territory rejected"
            );
            return Err(DomainError::RegionMismatch {
                plan_id,
                departement_code: departement_code.to_owned(),
                expected_region,
                found_region,
            });
        }
    }

    Ok(found_region)
}

fn region_of(
    geography: &dyn GeographyReader,
    departement_code: &str,
) -> Result<String, GeographyError> {
    geography
        .departement(departement_code)
        .map(|d| d.region_code.clone())
        .ok_or_else(|| GeographyError::dangling(GeographicLevel::Departement, departement_code))
}
