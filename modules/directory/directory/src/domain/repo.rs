use async_trait::async_trait;
use rb_db::secure::DBRunner;
use rb_security::AccessScope;

use super::error::DomainError;
use super::model::{NewUser, Organization, Placement, User};

#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn insert_organization<C: DBRunner>(
        &self,
        conn: &C,
        name: &str,
        placement: &Placement,
    ) -> Result<Organization, DomainError>;

    /// Returns `false` when no organization has this id.
    async fn update_placement<C: DBRunner>(
        &self,
        conn: &C,
        id: i64,
        placement: &Placement,
    ) -> Result<bool, DomainError>;

    async fn find_organization<C: DBRunner>(
        &self,
        conn: &C,
        id: i64,
    ) -> Result<Option<Organization>, DomainError>;

    async fn list_organizations<C: DBRunner>(
        &self,
        conn: &C,
        scope: &AccessScope,
    ) -> Result<Vec<Organization>, DomainError>;

    async fn insert_user<C: DBRunner>(
        &self,
        conn: &C,
        user: &NewUser,
    ) -> Result<User, DomainError>;

    async fn find_user<C: DBRunner>(&self, conn: &C, id: i64)
    -> Result<Option<User>, DomainError>;
}
