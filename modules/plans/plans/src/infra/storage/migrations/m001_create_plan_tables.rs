use sea_orm_migration::prelude::*;

use super::{PlanTerritories, Plans};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_create_plan_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Plans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Plans::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Plans::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlanTerritories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlanTerritories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlanTerritories::PlanId).integer().not_null())
                    .col(
                        ColumnDef::new(PlanTerritories::DepartementCode)
                            .string_len(3)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlanTerritories::RegionCode).string_len(2).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plan_territories_plan")
                            .from(PlanTerritories::Table, PlanTerritories::PlanId)
                            .to(Plans::Table, Plans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_plan_territories_plan_departement")
                    .table(PlanTerritories::Table)
                    .col(PlanTerritories::PlanId)
                    .col(PlanTerritories::DepartementCode)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlanTerritories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Plans::Table).to_owned())
            .await
    }
}
