use sea_orm_migration::prelude::*;

use super::{Cities, Departements, Epcis, Regions};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_create_reference_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Regions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Regions::Code).string_len(2).not_null().primary_key())
                    .col(ColumnDef::new(Regions::Name).string().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Departements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Departements::Code)
                            .string_len(3)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Departements::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Departements::Latitude).double().not_null())
                    .col(ColumnDef::new(Departements::Longitude).double().not_null())
                    .col(ColumnDef::new(Departements::RegionCode).string_len(2).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_departements_region")
                            .from(Departements::Table, Departements::RegionCode)
                            .to(Regions::Table, Regions::Code),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Epcis::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Epcis::Code).string_len(9).not_null().primary_key())
                    .col(ColumnDef::new(Epcis::Name).string().not_null())
                    .col(ColumnDef::new(Epcis::DepartementCode).string_len(3).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_epcis_departement")
                            .from(Epcis::Table, Epcis::DepartementCode)
                            .to(Departements::Table, Departements::Code),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Cities::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Cities::Code).string_len(5).not_null().primary_key())
                    .col(ColumnDef::new(Cities::Name).string().not_null())
                    .col(ColumnDef::new(Cities::DepartementCode).string_len(3).not_null())
                    .col(ColumnDef::new(Cities::EpciCode).string_len(9).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cities_departement")
                            .from(Cities::Table, Cities::DepartementCode)
                            .to(Departements::Table, Departements::Code),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cities_epci")
                            .from(Cities::Table, Cities::EpciCode)
                            .to(Epcis::Table, Epcis::Code),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Epcis::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Regions::Table).to_owned())
            .await
    }
}
