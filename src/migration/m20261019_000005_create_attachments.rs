//! Create attachments table.

use sea_orm_migration::prelude::*;

use super::m20261019_000003_create_cases::Case;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attachment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attachment::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Attachment::CaseId).uuid().not_null())
                    .col(
                        ColumnDef::new(Attachment::OriginalFilename)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Attachment::StorageKey).string().not_null())
                    .col(ColumnDef::new(Attachment::Kind).string().not_null())
                    .col(ColumnDef::new(Attachment::SizeBytes).big_integer().not_null())
                    .col(ColumnDef::new(Attachment::MimeType).string())
                    .col(
                        ColumnDef::new(Attachment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Attachment::Table, Attachment::CaseId)
                            .to(Case::Table, Case::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attachments_case")
                    .table(Attachment::Table)
                    .col(Attachment::CaseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attachment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Attachment {
    #[sea_orm(iden = "attachments")]
    Table,
    Id,
    CaseId,
    OriginalFilename,
    StorageKey,
    Kind,
    SizeBytes,
    MimeType,
    CreatedAt,
}
