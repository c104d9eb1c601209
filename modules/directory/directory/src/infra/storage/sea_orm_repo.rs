use async_trait::async_trait;
use rb_db::secure::{
    DBRunner, ScopeConstraint, ScopeFilter, SecureSelectExt, SecureUpdateExt, pep_properties,
    secure_insert,
};
use rb_security::{AccessScope, GeoPointerColumns};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue, EntityTrait, Order};

use crate::domain::error::DomainError;
use crate::domain::model::{NewUser, Organization, Placement, User};
use crate::domain::repo::DirectoryRepository;

use super::entity::{organization, user};

pub struct SeaOrmDirectoryRepository;

impl SeaOrmDirectoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for SeaOrmDirectoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-row scope on the serial id.
fn by_id(id: i64) -> AccessScope {
    AccessScope::single(ScopeConstraint::new(vec![ScopeFilter::eq(
        pep_properties::RESOURCE_ID,
        id,
    )]))
}

fn row_id(id: i64) -> Option<i32> {
    i32::try_from(id).ok()
}

#[async_trait]
impl DirectoryRepository for SeaOrmDirectoryRepository {
    async fn insert_organization<C: DBRunner>(
        &self,
        conn: &C,
        name: &str,
        placement: &Placement,
    ) -> Result<Organization, DomainError> {
        let pointer = GeoPointerColumns::from(&placement.pointer);
        let am = organization::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name.to_owned()),
            region_code: ActiveValue::Set(pointer.region_code),
            departement_code: ActiveValue::Set(pointer.departement_code),
            epci_code: ActiveValue::Set(pointer.epci_code),
            city_code: ActiveValue::Set(pointer.city_code),
            scope_region_code: ActiveValue::Set(placement.region_code.clone()),
            scope_departement_code: ActiveValue::Set(placement.departement_code.clone()),
            scope_epci_code: ActiveValue::Set(placement.epci_code.clone()),
            scope_city_code: ActiveValue::Set(placement.city_code.clone()),
        };

        // Directory writes are administrative: the row is checked for
        // geo consistency, not against a caller scope.
        let model =
            secure_insert::<organization::Entity>(am, &AccessScope::allow_all(), conn).await?;
        Organization::try_from(model)
    }

    async fn update_placement<C: DBRunner>(
        &self,
        conn: &C,
        id: i64,
        placement: &Placement,
    ) -> Result<bool, DomainError> {
        let pointer = GeoPointerColumns::from(&placement.pointer);
        let result = organization::Entity::update_many()
            .secure()
            .scope_with(&by_id(id))
            .col_expr(organization::Column::RegionCode, Expr::value(pointer.region_code))
            .col_expr(
                organization::Column::DepartementCode,
                Expr::value(pointer.departement_code),
            )
            .col_expr(organization::Column::EpciCode, Expr::value(pointer.epci_code))
            .col_expr(organization::Column::CityCode, Expr::value(pointer.city_code))
            .col_expr(
                organization::Column::ScopeRegionCode,
                Expr::value(placement.region_code.clone()),
            )
            .col_expr(
                organization::Column::ScopeDepartementCode,
                Expr::value(placement.departement_code.clone()),
            )
            .col_expr(
                organization::Column::ScopeEpciCode,
                Expr::value(placement.epci_code.clone()),
            )
            .col_expr(
                organization::Column::ScopeCityCode,
                Expr::value(placement.city_code.clone()),
            )
            .exec(conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_organization<C: DBRunner>(
        &self,
        conn: &C,
        id: i64,
    ) -> Result<Option<Organization>, DomainError> {
        organization::Entity::find()
            .secure()
            .scope_with(&by_id(id))
            .one(conn)
            .await?
            .map(Organization::try_from)
            .transpose()
    }

    async fn list_organizations<C: DBRunner>(
        &self,
        conn: &C,
        scope: &AccessScope,
    ) -> Result<Vec<Organization>, DomainError> {
        organization::Entity::find()
            .secure()
            .scope_with(scope)
            .order_by(organization::Column::Name, Order::Asc)
            .all(conn)
            .await?
            .into_iter()
            .map(Organization::try_from)
            .collect()
    }

    async fn insert_user<C: DBRunner>(
        &self,
        conn: &C,
        new: &NewUser,
    ) -> Result<User, DomainError> {
        let organization_id = row_id(new.organization_id).ok_or(DomainError::NotFound {
            entity: "organization",
            id: new.organization_id,
        })?;
        let am = user::ActiveModel {
            id: ActiveValue::NotSet,
            email: ActiveValue::Set(new.email.clone()),
            role: ActiveValue::Set(new.role.as_str().to_owned()),
            organization_id: ActiveValue::Set(organization_id),
        };
        let model = secure_insert::<user::Entity>(am, &AccessScope::allow_all(), conn).await?;
        User::try_from(model)
    }

    async fn find_user<C: DBRunner>(
        &self,
        conn: &C,
        id: i64,
    ) -> Result<Option<User>, DomainError> {
        user::Entity::find()
            .secure()
            .scope_with(&by_id(id))
            .one(conn)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

