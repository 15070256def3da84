//! Create `restaurants`.
//!
//! `slug` uniqueness is enforced by `uniq_restaurants_slug`, added with the
//! other indexes so legacy tables that gained the column late share the path.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Restaurants::Table)
                    .if_not_exists()
                    .col(pk_auto(Restaurants::Id))
                    .col(string_len(Restaurants::Name, 255).unique_key())
                    .col(string_len_null(Restaurants::Slug, 255))
                    .col(string_len_null(Restaurants::Address, 255))
                    .col(text_null(Restaurants::Description))
                    .col(string_len_null(Restaurants::ImageUrl, 512))
                    .col(string_len_null(Restaurants::Category, 64))
                    .col(string_len_null(Restaurants::PriceRange, 16))
                    .col(double(Restaurants::Rating).default(0.0))
                    .col(boolean(Restaurants::IsActive).default(true))
                    .col(boolean(Restaurants::Deleted).default(false))
                    .col(timestamp_with_time_zone(Restaurants::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Restaurants::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Restaurants::Table).if_exists().to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Restaurants {
    Table,
    Id,
    Name,
    Slug,
    Address,
    Description,
    ImageUrl,
    Category,
    PriceRange,
    Rating,
    IsActive,
    Deleted,
    CreatedAt,
    UpdatedAt,
}
