//! Reads the reference tables back into a [`GeoDataset`].

use geography_sdk::GeoDataset;
use rb_db::secure::{AccessScope, DBRunner, SecureSelectExt};
use sea_orm::{EntityTrait, Order};

use super::entity::{city, departement, epci, region};
use crate::domain::DomainError;

/// Load every reference row, ordered by code.
///
/// # Errors
/// Returns [`DomainError::Database`] when a table cannot be read.
pub async fn load_dataset(runner: &impl DBRunner) -> Result<GeoDataset, DomainError> {
    let all = AccessScope::allow_all();

    let regions = region::Entity::find()
        .secure()
        .scope_with(&all)
        .order_by(region::Column::Code, Order::Asc)
        .all(runner)
        .await?;
    let departements = departement::Entity::find()
        .secure()
        .scope_with(&all)
        .order_by(departement::Column::Code, Order::Asc)
        .all(runner)
        .await?;
    let epcis = epci::Entity::find()
        .secure()
        .scope_with(&all)
        .order_by(epci::Column::Code, Order::Asc)
        .all(runner)
        .await?;
    let cities = city::Entity::find()
        .secure()
        .scope_with(&all)
        .order_by(city::Column::Code, Order::Asc)
        .all(runner)
        .await?;

    Ok(GeoDataset {
        regions: regions.into_iter().map(Into::into).collect(),
        departements: departements.into_iter().map(Into::into).collect(),
        epcis: epcis.into_iter().map(Into::into).collect(),
        cities: cities.into_iter().map(Into::into).collect(),
    })
}
