use rb_db::secure::{ScopableEntity, pep_properties};
use rb_security::Role;
use sea_orm::entity::prelude::*;

use crate::domain::error::DomainError;
use crate::domain::model::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub role: String,
    pub organization_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    fn resolve_property(property: &str) -> Option<Column> {
        match property {
            pep_properties::RESOURCE_ID => Some(Column::Id),
            _ => None,
        }
    }
}

impl TryFrom<Model> for User {
    type Error = DomainError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let role: Role = m
            .role
            .parse()
            .map_err(|e| DomainError::internal(format!("user {}: {e}", m.id)))?;
        Ok(Self {
            id: i64::from(m.id),
            email: m.email,
            role,
            organization_id: i64::from(m.organization_id),
        })
    }
}
