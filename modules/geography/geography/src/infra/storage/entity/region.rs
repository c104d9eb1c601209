use rb_db::secure::{ScopableEntity, pep_properties};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "regions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::departement::Entity")]
    Departements,
}

impl Related<super::departement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Departements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    const IS_UNRESTRICTED: bool = true;

    fn resolve_property(property: &str) -> Option<Column> {
        match property {
            pep_properties::REGION_CODE => Some(Column::Code),
            _ => None,
        }
    }
}

impl From<Model> for geography_sdk::Region {
    fn from(m: Model) -> Self {
        Self {
            code: m.code,
            name: m.name,
        }
    }
}
