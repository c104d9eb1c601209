use sea_orm_migration::prelude::*;

use super::{Organizations, Users};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_create_directory_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organizations::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Organizations::RegionCode).string_len(2).null())
                    .col(ColumnDef::new(Organizations::DepartementCode).string_len(3).null())
                    .col(ColumnDef::new(Organizations::EpciCode).string_len(9).null())
                    .col(ColumnDef::new(Organizations::CityCode).string_len(5).null())
                    .col(ColumnDef::new(Organizations::ScopeRegionCode).string_len(2).null())
                    .col(
                        ColumnDef::new(Organizations::ScopeDepartementCode)
                            .string_len(3)
                            .null(),
                    )
                    .col(ColumnDef::new(Organizations::ScopeEpciCode).string_len(9).null())
                    .col(ColumnDef::new(Organizations::ScopeCityCode).string_len(5).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organizations_scope_departement")
                    .table(Organizations::Table)
                    .col(Organizations::ScopeDepartementCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Role).string_len(32).not_null())
                    .col(ColumnDef::new(Users::OrganizationId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_organization")
                            .from(Users::Table, Users::OrganizationId)
                            .to(Organizations::Table, Organizations::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await
    }
}
