//! Create `reviews`.
//!
//! Reviews outlive their author (`user_id` set NULL) but not their
//! restaurant (cascade). Manager replies are mirrored in `responded_by`,
//! `response_text` and `response_date`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(pk_auto(Reviews::Id))
                    .col(integer_null(Reviews::UserId))
                    .col(integer(Reviews::RestaurantId))
                    .col(text(Reviews::Content))
                    .col(integer(Reviews::Rating))
                    .col(string_len(Reviews::Type, 16).default("inRestaurant"))
                    .col(boolean(Reviews::Deleted).default(false))
                    .col(integer_null(Reviews::RespondedBy))
                    .col(text_null(Reviews::ResponseText))
                    .col(timestamp_with_time_zone_null(Reviews::ResponseDate))
                    .col(timestamp_with_time_zone(Reviews::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Reviews::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_user")
                            .from(Reviews::Table, Reviews::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_restaurant")
                            .from(Reviews::Table, Reviews::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Reviews::Table).if_exists().to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    UserId,
    RestaurantId,
    Content,
    Rating,
    Type,
    Deleted,
    RespondedBy,
    ResponseText,
    ResponseDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users { Table, Id }

#[derive(DeriveIden)]
enum Restaurants { Table, Id }
