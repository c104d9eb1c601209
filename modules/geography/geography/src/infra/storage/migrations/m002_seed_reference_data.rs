//! Seeds the reference tables from the embedded dataset.

use geography_sdk::{GeoDataset, GeoSnapshot};
use sea_orm_migration::prelude::*;

use super::{Cities, Departements, Epcis, Regions};
use crate::EMBEDDED_DATASET;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m002_seed_reference_data"
    }
}

fn custom(e: impl std::fmt::Display) -> DbErr {
    DbErr::Custom(e.to_string())
}

/// The embedded dataset, validated before anything is written.
fn dataset() -> Result<GeoDataset, DbErr> {
    let dataset = GeoDataset::from_json(EMBEDDED_DATASET).map_err(custom)?;
    Ok(GeoSnapshot::from_dataset(dataset).map_err(custom)?.to_dataset())
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let dataset = dataset()?;

        // Parents before children so foreign keys hold at every step.
        if !dataset.regions.is_empty() {
            let mut insert = Query::insert();
            insert
                .into_table(Regions::Table)
                .columns([Regions::Code, Regions::Name]);
            for r in &dataset.regions {
                insert
                    .values([r.code.clone().into(), r.name.clone().into()])
                    .map_err(custom)?;
            }
            manager.exec_stmt(insert).await?;
        }

        if !dataset.departements.is_empty() {
            let mut insert = Query::insert();
            insert.into_table(Departements::Table).columns([
                Departements::Code,
                Departements::Name,
                Departements::Latitude,
                Departements::Longitude,
                Departements::RegionCode,
            ]);
            for d in &dataset.departements {
                insert
                    .values([
                        d.code.clone().into(),
                        d.name.clone().into(),
                        d.latitude.into(),
                        d.longitude.into(),
                        d.region_code.clone().into(),
                    ])
                    .map_err(custom)?;
            }
            manager.exec_stmt(insert).await?;
        }

        if !dataset.epcis.is_empty() {
            let mut insert = Query::insert();
            insert.into_table(Epcis::Table).columns([
                Epcis::Code,
                Epcis::Name,
                Epcis::DepartementCode,
            ]);
            for e in &dataset.epcis {
                insert
                    .values([
                        e.code.clone().into(),
                        e.name.clone().into(),
                        e.departement_code.clone().into(),
                    ])
                    .map_err(custom)?;
            }
            manager.exec_stmt(insert).await?;
        }

        if !dataset.cities.is_empty() {
            let mut insert = Query::insert();
            insert.into_table(Cities::Table).columns([
                Cities::Code,
                Cities::Name,
                Cities::DepartementCode,
                Cities::EpciCode,
            ]);
            for c in &dataset.cities {
                insert
                    .values([
                        c.code.clone().into(),
                        c.name.clone().into(),
                        c.departement_code.clone().into(),
                        c.epci_code.clone().into(),
                    ])
                    .map_err(custom)?;
            }
            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(Query::delete().from_table(Cities::Table).to_owned())
            .await?;
        manager
            .exec_stmt(Query::delete().from_table(Epcis::Table).to_owned())
            .await?;
        manager
            .exec_stmt(Query::delete().from_table(Departements::Table).to_owned())
            .await?;
        manager
            .exec_stmt(Query::delete().from_table(Regions::Table).to_owned())
            .await
    }
}
