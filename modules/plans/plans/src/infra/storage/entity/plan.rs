use rb_db::secure::{ScopableEntity, pep_properties};
use sea_orm::entity::prelude::*;

use crate::domain::model::Plan;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    fn resolve_property(property: &str) -> Option<Column> {
        match property {
            pep_properties::RESOURCE_ID => Some(Column::Id),
            _ => None,
        }
    }
}

impl From<Model> for Plan {
    fn from(m: Model) -> Self {
        Self {
            id: i64::from(m.id),
            name: m.name,
        }
    }
}
