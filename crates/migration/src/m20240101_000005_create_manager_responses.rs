//! Create `manager_responses`; at most one per review.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ManagerResponses::Table)
                    .if_not_exists()
                    .col(pk_auto(ManagerResponses::Id))
                    .col(integer(ManagerResponses::ReviewId).unique_key())
                    .col(integer(ManagerResponses::ManagerId))
                    .col(text(ManagerResponses::ResponseText))
                    .col(timestamp_with_time_zone(ManagerResponses::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(ManagerResponses::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_manager_responses_review")
                            .from(ManagerResponses::Table, ManagerResponses::ReviewId)
                            .to(Reviews::Table, Reviews::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_manager_responses_manager")
                            .from(ManagerResponses::Table, ManagerResponses::ManagerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ManagerResponses::Table).if_exists().to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ManagerResponses { Table, Id, ReviewId, ManagerId, ResponseText, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Reviews { Table, Id }

#[derive(DeriveIden)]
enum Users { Table, Id }
