use rb_db::secure::{ScopableEntity, pep_properties};
use rb_security::GeoPointerColumns;
use sea_orm::entity::prelude::*;

use crate::domain::error::DomainError;
use crate::domain::model::Organization;

/// `region_code` .. `city_code` hold the organization's own pointer (at most
/// one set). The `scope_*` columns hold every code that pointer resolves to
/// and are the ones authorization filters apply to.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub region_code: Option<String>,
    pub departement_code: Option<String>,
    pub epci_code: Option<String>,
    pub city_code: Option<String>,
    pub scope_region_code: Option<String>,
    pub scope_departement_code: Option<String>,
    pub scope_epci_code: Option<String>,
    pub scope_city_code: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ScopableEntity for Entity {
    fn resolve_property(property: &str) -> Option<Column> {
        match property {
            pep_properties::REGION_CODE => Some(Column::ScopeRegionCode),
            pep_properties::DEPARTEMENT_CODE => Some(Column::ScopeDepartementCode),
            pep_properties::EPCI_CODE => Some(Column::ScopeEpciCode),
            pep_properties::CITY_CODE => Some(Column::ScopeCityCode),
            pep_properties::RESOURCE_ID => Some(Column::Id),
            _ => None,
        }
    }
}

impl TryFrom<Model> for Organization {
    type Error = DomainError;

    /// Stored pointers are re-checked on the way out as well.
    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let location = GeoPointerColumns {
            region_code: m.region_code,
            departement_code: m.departement_code,
            epci_code: m.epci_code,
            city_code: m.city_code,
        }
        .check_geo_consistency()?;

        Ok(Self {
            id: i64::from(m.id),
            name: m.name,
            location,
        })
    }
}
