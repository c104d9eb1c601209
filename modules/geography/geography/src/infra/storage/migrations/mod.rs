use sea_orm_migration::prelude::*;

mod m001_create_reference_tables;
mod m002_seed_reference_data;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m001_create_reference_tables::Migration),
            Box::new(m002_seed_reference_data::Migration),
        ]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("geography_migrations").into_iden()
    }
}

#[derive(DeriveIden)]
pub(crate) enum Regions {
    Table,
    Code,
    Name,
}

#[derive(DeriveIden)]
pub(crate) enum Departements {
    Table,
    Code,
    Name,
    Latitude,
    Longitude,
    RegionCode,
}

#[derive(DeriveIden)]
pub(crate) enum Epcis {
    Table,
    Code,
    Name,
    DepartementCode,
}

#[derive(DeriveIden)]
pub(crate) enum Cities {
    Table,
    Code,
    Name,
    DepartementCode,
    EpciCode,
}
