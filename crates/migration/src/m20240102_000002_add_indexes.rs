use sea_orm_migration::prelude::*;

use crate::schema_ops::ensure_index;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Restaurants: unique slug, category filter
        ensure_index(
            manager,
            "restaurants",
            "uniq_restaurants_slug",
            Index::create()
                .name("uniq_restaurants_slug")
                .table(Restaurants::Table)
                .col(Restaurants::Slug)
                .unique()
                .to_owned(),
        )
        .await?;
        ensure_index(
            manager,
            "restaurants",
            "idx_restaurants_category",
            Index::create()
                .name("idx_restaurants_category")
                .table(Restaurants::Table)
                .col(Restaurants::Category)
                .to_owned(),
        )
        .await?;

        // Users: role lookups for admin listings
        ensure_index(
            manager,
            "users",
            "idx_users_role",
            Index::create().name("idx_users_role").table(Users::Table).col(Users::Role).to_owned(),
        )
        .await?;

        // Reviews: per-restaurant listing with soft-delete filter, per-user history
        ensure_index(
            manager,
            "reviews",
            "idx_reviews_restaurant",
            Index::create()
                .name("idx_reviews_restaurant")
                .table(Reviews::Table)
                .col(Reviews::RestaurantId)
                .col(Reviews::Deleted)
                .to_owned(),
        )
        .await?;
        ensure_index(
            manager,
            "reviews",
            "idx_reviews_user",
            Index::create().name("idx_reviews_user").table(Reviews::Table).col(Reviews::UserId).to_owned(),
        )
        .await?;

        ensure_index(
            manager,
            "deleted_reviews",
            "idx_deleted_reviews_original",
            Index::create()
                .name("idx_deleted_reviews_original")
                .table(DeletedReviews::Table)
                .col(DeletedReviews::OriginalId)
                .to_owned(),
        )
        .await?;

        ensure_index(
            manager,
            "error_reports",
            "idx_error_reports_status",
            Index::create()
                .name("idx_error_reports_status")
                .table(ErrorReports::Table)
                .col(ErrorReports::Status)
                .to_owned(),
        )
        .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let drops = [
            ("uniq_restaurants_slug", "restaurants"),
            ("idx_restaurants_category", "restaurants"),
            ("idx_users_role", "users"),
            ("idx_reviews_restaurant", "reviews"),
            ("idx_reviews_user", "reviews"),
            ("idx_deleted_reviews_original", "deleted_reviews"),
            ("idx_error_reports_status", "error_reports"),
        ];
        for (name, table) in drops {
            if manager.has_index(table, name).await? {
                manager
                    .drop_index(Index::drop().name(name).table(Alias::new(table)).to_owned())
                    .await?;
            }
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Restaurants { Table, Slug, Category }

#[derive(DeriveIden)]
enum Users { Table, Role }

#[derive(DeriveIden)]
enum Reviews { Table, RestaurantId, UserId, Deleted }

#[derive(DeriveIden)]
enum DeletedReviews { Table, OriginalId }

#[derive(DeriveIden)]
enum ErrorReports { Table, Status }
