//! Create donation table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Donation::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Donation::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Donation::DonationRequestId).string_len(32).not_null())
                    .col(ColumnDef::new(Donation::DonorId).string_len(32).not_null())
                    .col(ColumnDef::new(Donation::Amount).decimal_len(14, 2).not_null())
                    .col(ColumnDef::new(Donation::Message).text())
                    .col(
                        ColumnDef::new(Donation::IsAnonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Donation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_donation_donation_request")
                            .from(Donation::Table, Donation::DonationRequestId)
                            .to(DonationRequest::Table, DonationRequest::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_donation_donor")
                            .from(Donation::Table, Donation::DonorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: donation_request_id + created_at (request donation list)
        manager
            .create_index(
                Index::create()
                    .name("idx_donation_request_id_created_at")
                    .table(Donation::Table)
                    .col(Donation::DonationRequestId)
                    .col(Donation::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: donor_id (my donations)
        manager
            .create_index(
                Index::create()
                    .name("idx_donation_donor_id")
                    .table(Donation::Table)
                    .col(Donation::DonorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Donation::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Donation {
    Table,
    Id,
    DonationRequestId,
    DonorId,
    Amount,
    Message,
    IsAnonymous,
    CreatedAt,
}

#[derive(Iden)]
enum DonationRequest {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
