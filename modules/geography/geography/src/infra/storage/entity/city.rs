use rb_db::secure::{ScopableEntity, pep_properties};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub name: String,
    pub departement_code: String,
    pub epci_code: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departement::Entity",
        from = "Column::DepartementCode",
        to = "super::departement::Column::Code"
    )]
    Departement,
    #[sea_orm(
        belongs_to = "super::epci::Entity",
        from = "Column::EpciCode",
        to = "super::epci::Column::Code"
    )]
    Epci,
}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    const IS_UNRESTRICTED: bool = true;

    fn resolve_property(property: &str) -> Option<Column> {
        match property {
            pep_properties::CITY_CODE => Some(Column::Code),
            pep_properties::DEPARTEMENT_CODE => Some(Column::DepartementCode),
            pep_properties::EPCI_CODE => Some(Column::EpciCode),
            _ => None,
        }
    }
}

impl From<Model> for geography_sdk::City {
    fn from(m: Model) -> Self {
        Self {
            code: m.code,
            name: m.name,
            departement_code: m.departement_code,
            epci_code: m.epci_code,
        }
    }
}
