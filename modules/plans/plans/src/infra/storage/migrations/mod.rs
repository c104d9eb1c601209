use sea_orm_migration::prelude::*;

mod m001_create_plan_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m001_create_plan_tables::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("plans_migrations").into_iden()
    }
}

#[derive(DeriveIden)]
enum Plans {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum PlanTerritories {
    Table,
    Id,
    PlanId,
    DepartementCode,
    RegionCode,
}
