//! Create donation request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DonationRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DonationRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DonationRequest::Slug).string_len(300).not_null())
                    .col(ColumnDef::new(DonationRequest::Title).string_len(255).not_null())
                    .col(ColumnDef::new(DonationRequest::Description).text().not_null())
                    .col(ColumnDef::new(DonationRequest::CategoryId).integer().not_null())
                    .col(ColumnDef::new(DonationRequest::OrganizerId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(DonationRequest::OrganizationId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DonationRequest::Urgency)
                            .string_len(8)
                            .not_null()
                            .default("MEDIUM"),
                    )
                    .col(
                        ColumnDef::new(DonationRequest::AcceptsMoney)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DonationRequest::AcceptsItems)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DonationRequest::AcceptsVolunteer)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(DonationRequest::GoalAmount).decimal_len(14, 2))
                    .col(
                        ColumnDef::new(DonationRequest::CurrentAmount)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(DonationRequest::PaymentMethods).json_binary())
                    .col(ColumnDef::new(DonationRequest::ItemsNeeded).text())
                    .col(ColumnDef::new(DonationRequest::VolunteersNeeded).integer())
                    .col(
                        ColumnDef::new(DonationRequest::VolunteersReceived)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(DonationRequest::VolunteerDetails).text())
                    .col(ColumnDef::new(DonationRequest::Location).string_len(255))
                    .col(ColumnDef::new(DonationRequest::Latitude).double())
                    .col(ColumnDef::new(DonationRequest::Longitude).double())
                    .col(
                        ColumnDef::new(DonationRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(ColumnDef::new(DonationRequest::ExpiresAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(DonationRequest::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(DonationRequest::ApprovedBy).string_len(32))
                    .col(ColumnDef::new(DonationRequest::RejectedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(DonationRequest::ViewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DonationRequest::Supporters)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DonationRequest::RecommendationScore)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DonationRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(DonationRequest::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_donation_request_category")
                            .from(DonationRequest::Table, DonationRequest::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_donation_request_organizer")
                            .from(DonationRequest::Table, DonationRequest::OrganizerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_donation_request_organization")
                            .from(DonationRequest::Table, DonationRequest::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: slug
        manager
            .create_index(
                Index::create()
                    .name("idx_donation_request_slug")
                    .table(DonationRequest::Table)
                    .col(DonationRequest::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: status + created_at (public browse, moderation queue)
        manager
            .create_index(
                Index::create()
                    .name("idx_donation_request_status_created_at")
                    .table(DonationRequest::Table)
                    .col(DonationRequest::Status)
                    .col(DonationRequest::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_donation_request_organizer_id")
                    .table(DonationRequest::Table)
                    .col(DonationRequest::OrganizerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_donation_request_category_id")
                    .table(DonationRequest::Table)
                    .col(DonationRequest::CategoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DonationRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DonationRequest {
    Table,
    Id,
    Slug,
    Title,
    Description,
    CategoryId,
    OrganizerId,
    OrganizationId,
    Urgency,
    AcceptsMoney,
    AcceptsItems,
    AcceptsVolunteer,
    GoalAmount,
    CurrentAmount,
    PaymentMethods,
    ItemsNeeded,
    VolunteersNeeded,
    VolunteersReceived,
    VolunteerDetails,
    Location,
    Latitude,
    Longitude,
    Status,
    ExpiresAt,
    ApprovedAt,
    ApprovedBy,
    RejectedAt,
    ViewCount,
    Supporters,
    RecommendationScore,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Organization {
    Table,
    Id,
}
