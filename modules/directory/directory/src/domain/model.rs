use geography_sdk::ResolvedScope;
use rb_security::{GeoPointer, Role};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub location: GeoPointer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub organization_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub role: Role,
    pub organization_id: i64,
}

impl NewUser {
    #[must_use]
    pub fn new(email: impl Into<String>, role: Role, organization_id: i64) -> Self {
        Self {
            email: email.into(),
            role,
            organization_id,
        }
    }
}

/// An organization's pointer together with every ancestor code it resolves
/// to. The ancestor codes are stored alongside the pointer so that list
/// queries can filter organizations at any level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub pointer: GeoPointer,
    pub region_code: Option<String>,
    pub departement_code: Option<String>,
    pub epci_code: Option<String>,
    pub city_code: Option<String>,
}

impl Placement {
    #[must_use]
    pub fn new(pointer: GeoPointer, scope: &ResolvedScope) -> Self {
        Self {
            pointer,
            region_code: scope.region_code().map(str::to_owned),
            departement_code: scope.departement_code().map(str::to_owned),
            epci_code: scope.epci_code().map(str::to_owned),
            city_code: scope.city_code().map(str::to_owned),
        }
    }
}
