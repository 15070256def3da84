//! Create `users` with nullable FK to `restaurants` (managers only).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Name, 128))
                    .col(string_len(Users::Email, 255).unique_key())
                    .col(string_len(Users::Password, 255))
                    .col(string_len(Users::Role, 16).default("user"))
                    .col(boolean(Users::IsBlocked).default(false))
                    .col(string_len_null(Users::BlockedReason, 512))
                    .col(integer_null(Users::RestaurantId))
                    .col(timestamp_with_time_zone(Users::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Users::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_restaurant")
                            .from(Users::Table, Users::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).if_exists().to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users { Table, Id, Name, Email, Password, Role, IsBlocked, BlockedReason, RestaurantId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Restaurants { Table, Id }
