//! Create story table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Story::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Story::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Story::DonationRequestId).string_len(32).not_null())
                    .col(ColumnDef::new(Story::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Story::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Story::Content).text().not_null())
                    .col(ColumnDef::new(Story::StoryType).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Story::Status)
                            .string_len(16)
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(ColumnDef::new(Story::MediaType).string_len(8).not_null())
                    .col(ColumnDef::new(Story::MediaPath).string_len(512).not_null())
                    .col(ColumnDef::new(Story::MediaUrl).string_len(1024).not_null())
                    .col(ColumnDef::new(Story::Duration).integer().not_null().default(5))
                    .col(ColumnDef::new(Story::Views).integer().not_null().default(0))
                    .col(ColumnDef::new(Story::PublishedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Story::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Story::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_story_donation_request")
                            .from(Story::Table, Story::DonationRequestId)
                            .to(DonationRequest::Table, DonationRequest::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_story_author")
                            .from(Story::Table, Story::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: author_id + created_at (organizer stats windows)
        manager
            .create_index(
                Index::create()
                    .name("idx_story_author_id_created_at")
                    .table(Story::Table)
                    .col(Story::AuthorId)
                    .col(Story::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: status + published_at (public feed)
        manager
            .create_index(
                Index::create()
                    .name("idx_story_status_published_at")
                    .table(Story::Table)
                    .col(Story::Status)
                    .col(Story::PublishedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_story_donation_request_id")
                    .table(Story::Table)
                    .col(Story::DonationRequestId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Story::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Story {
    Table,
    Id,
    DonationRequestId,
    AuthorId,
    Title,
    Content,
    StoryType,
    Status,
    MediaType,
    MediaPath,
    MediaUrl,
    Duration,
    Views,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
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
