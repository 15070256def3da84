//! Create `error_reports`: user flags on reviews awaiting moderation.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ErrorReports::Table)
                    .if_not_exists()
                    .col(pk_auto(ErrorReports::Id))
                    .col(integer(ErrorReports::ReviewId))
                    .col(integer_null(ErrorReports::ReporterId))
                    .col(text(ErrorReports::Reason))
                    .col(string_len(ErrorReports::Status, 16).default("pending"))
                    .col(integer_null(ErrorReports::ResolvedBy))
                    .col(text_null(ErrorReports::ResolutionNote))
                    .col(timestamp_with_time_zone_null(ErrorReports::ResolvedAt))
                    .col(timestamp_with_time_zone(ErrorReports::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_error_reports_review")
                            .from(ErrorReports::Table, ErrorReports::ReviewId)
                            .to(Reviews::Table, Reviews::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_error_reports_reporter")
                            .from(ErrorReports::Table, ErrorReports::ReporterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ErrorReports::Table).if_exists().to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ErrorReports {
    Table,
    Id,
    ReviewId,
    ReporterId,
    Reason,
    Status,
    ResolvedBy,
    ResolutionNote,
    ResolvedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Reviews { Table, Id }

#[derive(DeriveIden)]
enum Users { Table, Id }
