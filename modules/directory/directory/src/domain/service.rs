use std::sync::Arc;

use geography_sdk::GeographyClient;
use rb_db::Db;
use rb_security::{AccessScope, GeoPointerColumns, SecurityContext};
use tracing::{debug, info};

use super::error::DomainError;
use super::model::{NewUser, Organization, Placement, User};
use super::repo::DirectoryRepository;

const MAX_NAME_LENGTH: usize = 255;

pub struct Service<R: DirectoryRepository> {
    db: Db,
    repo: Arc<R>,
    geography: Arc<dyn GeographyClient>,
}

impl<R: DirectoryRepository> Service<R> {
    #[must_use]
    pub fn new(db: Db, repo: Arc<R>, geography: Arc<dyn GeographyClient>) -> Self {
        Self {
            db,
            repo,
            geography,
        }
    }

    /// Create an organization at `location`.
    ///
    /// # Errors
    /// - `InvalidGeoScope` when more than one pointer is set
    /// - `Geography(DanglingReference)` when the pointer names a missing row
    /// - `Conflict` when the name is taken
    #[tracing::instrument(skip_all, fields(name = %name))]
    pub async fn create_organization(
        &self,
        name: &str,
        location: &GeoPointerColumns,
    ) -> Result<Organization, DomainError> {
        let name = validate_name(name)?;
        let placement = self.place(location).await?;

        let conn = self.db.conn()?;
        let org = self.repo.insert_organization(&conn, name, &placement).await?;
        info!(organization_id = org.id, location = %org.location, "organization created");
        Ok(org)
    }

    /// Move an organization to `location`. Its users' scopes follow.
    ///
    /// # Errors
    /// Same checks as [`Service::create_organization`], plus `NotFound`.
    #[tracing::instrument(skip(self, location))]
    pub async fn relocate_organization(
        &self,
        id: i64,
        location: &GeoPointerColumns,
    ) -> Result<Organization, DomainError> {
        let placement = self.place(location).await?;

        let conn = self.db.conn()?;
        if !self.repo.update_placement(&conn, id, &placement).await? {
            return Err(DomainError::NotFound {
                entity: "organization",
                id,
            });
        }
        info!(organization_id = id, location = %placement.pointer, "organization relocated");
        self.require_organization(&conn, id).await
    }

    /// # Errors
    /// `NotFound` when no organization has this id.
    pub async fn get_organization(&self, id: i64) -> Result<Organization, DomainError> {
        let conn = self.db.conn()?;
        self.require_organization(&conn, id).await
    }

    /// Organizations whose placement falls within `scope`, ordered by name.
    ///
    /// # Errors
    /// Storage failures only; a deny-all scope yields an empty list.
    pub async fn list_organizations(
        &self,
        scope: &AccessScope,
    ) -> Result<Vec<Organization>, DomainError> {
        let conn = self.db.conn()?;
        self.repo.list_organizations(&conn, scope).await
    }

    /// # Errors
    /// - `Validation` for a malformed email
    /// - `NotFound` when the organization does not exist
    /// - `Conflict` when the email is taken
    #[tracing::instrument(skip(self, user), fields(role = %user.role, organization_id = user.organization_id))]
    pub async fn create_user(&self, user: NewUser) -> Result<User, DomainError> {
        let user = NewUser {
            email: normalize_email(&user.email)?,
            ..user
        };

        let conn = self.db.conn()?;
        self.require_organization(&conn, user.organization_id).await?;
        let created = self.repo.insert_user(&conn, &user).await?;
        info!(user_id = created.id, "user created");
        Ok(created)
    }

    /// # Errors
    /// `NotFound` when no user has this id.
    pub async fn get_user(&self, id: i64) -> Result<User, DomainError> {
        let conn = self.db.conn()?;
        self.repo
            .find_user(&conn, id)
            .await?
            .ok_or(DomainError::NotFound { entity: "user", id })
    }

    /// The context the authorization gate consumes for `user_id`: the user's
    /// role and the location of their organization.
    ///
    /// # Errors
    /// `NotFound` for an unknown user or organization.
    pub async fn security_context_for(&self, user_id: i64) -> Result<SecurityContext, DomainError> {
        let user = self.get_user(user_id).await?;
        let org = self.get_organization(user.organization_id).await?;
        debug!(user_id, role = %user.role, location = %org.location, "security context built");

        Ok(SecurityContext::builder()
            .subject_id(user.id)
            .role(user.role)
            .organization_id(org.id)
            .location(org.location)
            .build())
    }

    /// Check the candidate columns and resolve them against the geography.
    async fn place(&self, location: &GeoPointerColumns) -> Result<Placement, DomainError> {
        let pointer = location.check_geo_consistency().inspect_err(|e| {
            debug!(error = %e, "rejected inconsistent location");
        })?;
        let scope = self.geography.resolve_scope(&pointer).await?;
        Ok(Placement::new(pointer, &scope))
    }

    async fn require_organization(
        &self,
        conn: &rb_db::DbConn<'_>,
        id: i64,
    ) -> Result<Organization, DomainError> {
        self.repo
            .find_organization(conn, id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "organization",
                id,
            })
    }
}

fn validate_name(name: &str) -> Result<&str, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name", "must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::validation(
            "name",
            format!("must be at most {MAX_NAME_LENGTH} characters"),
        ));
    }
    Ok(name)
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(DomainError::validation("email", "must look like name@domain.tld")),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(validate_name("  Mairie de Paris ").unwrap(), "Mairie de Paris");
        assert!(matches!(
            validate_name("   "),
            Err(DomainError::Validation { field: "name", .. })
        ));
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email(" Agent@Paris.FR ").unwrap(), "agent@paris.fr");
        assert!(normalize_email("agent").is_err());
        assert!(normalize_email("@paris.fr").is_err());
        assert!(normalize_email("agent@localhost").is_err());
    }
}
