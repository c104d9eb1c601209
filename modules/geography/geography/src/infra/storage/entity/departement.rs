use rb_db::secure::{ScopableEntity, pep_properties};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "departements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Double")]
    pub latitude: f64,
    #[sea_orm(column_type = "Double")]
    pub longitude: f64,
    pub region_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::region::Entity",
        from = "Column::RegionCode",
        to = "super::region::Column::Code"
    )]
    Region,
}

impl Related<super::region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Region.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    const IS_UNRESTRICTED: bool = true;

    fn resolve_property(property: &str) -> Option<Column> {
        match property {
            pep_properties::DEPARTEMENT_CODE => Some(Column::Code),
            pep_properties::REGION_CODE => Some(Column::RegionCode),
            _ => None,
        }
    }
}

impl From<Model> for geography_sdk::Departement {
    fn from(m: Model) -> Self {
        Self {
            code: m.code,
            name: m.name,
            latitude: m.latitude,
            longitude: m.longitude,
            region_code: m.region_code,
        }
    }
}
