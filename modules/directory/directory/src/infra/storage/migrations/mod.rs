use sea_orm_migration::prelude::*;

mod m001_create_directory_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m001_create_directory_tables::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("directory_migrations").into_iden()
    }
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    Name,
    RegionCode,
    DepartementCode,
    EpciCode,
    CityCode,
    ScopeRegionCode,
    ScopeDepartementCode,
    ScopeEpciCode,
    ScopeCityCode,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Role,
    OrganizationId,
}
