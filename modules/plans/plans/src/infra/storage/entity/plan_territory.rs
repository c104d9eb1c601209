use rb_db::secure::{ScopableEntity, pep_properties};
use sea_orm::entity::prelude::*;

use crate::domain::model::PlanTerritory;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "plan_territories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub plan_id: i32,
    pub departement_code: String,
    pub region_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::plan::Entity",
        from = "Column::PlanId",
        to = "super::plan::Column::Id"
    )]
    Plan,
}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    fn resolve_property(property: &str) -> Option<Column> {
        match property {
            pep_properties::REGION_CODE => Some(Column::RegionCode),
            pep_properties::DEPARTEMENT_CODE => Some(Column::DepartementCode),
            pep_properties::RESOURCE_ID => Some(Column::Id),
            _ => None,
        }
    }
}

impl From<Model> for PlanTerritory {
    fn from(m: Model) -> Self {
        Self {
            plan_id: i64::from(m.plan_id),
            departement_code: m.departement_code,
            region_code: m.region_code,
        }
    }
}
