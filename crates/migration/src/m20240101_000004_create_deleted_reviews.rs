//! Create `deleted_reviews`, the archive of removed reviews.
//!
//! No foreign keys: archived rows must survive deletion of the users and
//! restaurants they mention.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DeletedReviews::Table)
                    .if_not_exists()
                    .col(pk_auto(DeletedReviews::Id))
                    .col(integer(DeletedReviews::OriginalId))
                    .col(integer_null(DeletedReviews::UserId))
                    .col(integer(DeletedReviews::RestaurantId))
                    .col(text(DeletedReviews::Content))
                    .col(integer(DeletedReviews::Rating))
                    .col(string_len(DeletedReviews::Type, 16))
                    .col(integer_null(DeletedReviews::DeletedBy))
                    .col(string_len_null(DeletedReviews::DeletionReason, 512))
                    .col(timestamp_with_time_zone(DeletedReviews::OriginalCreatedAt))
                    .col(timestamp_with_time_zone(DeletedReviews::DeletedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(DeletedReviews::Table).if_exists().to_owned()).await
    }
}

#[derive(DeriveIden)]
enum DeletedReviews {
    Table,
    Id,
    OriginalId,
    UserId,
    RestaurantId,
    Content,
    Rating,
    Type,
    DeletedBy,
    DeletionReason,
    OriginalCreatedAt,
    DeletedAt,
}
