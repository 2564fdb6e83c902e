//! Create organization table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organization::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organization::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organization::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Organization::OrgType).string_len(64).not_null())
                    .col(ColumnDef::new(Organization::RegistrationNumber).string_len(64))
                    .col(ColumnDef::new(Organization::ContactEmail).string_len(255).not_null())
                    .col(ColumnDef::new(Organization::ContactPhone).string_len(32))
                    .col(ColumnDef::new(Organization::Address).text())
                    .col(
                        ColumnDef::new(Organization::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Organization::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Organization {
    Table,
    Id,
    Name,
    OrgType,
    RegistrationNumber,
    ContactEmail,
    ContactPhone,
    Address,
    CreatedAt,
}
