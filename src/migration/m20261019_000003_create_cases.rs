//! Create cases table.

use sea_orm_migration::prelude::*;

use super::m20261019_000002_create_external_users::ExternalUser;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Case::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Case::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Case::CaseNumber).string().not_null())
                    .col(ColumnDef::new(Case::ExternalUserId).uuid().not_null())
                    .col(ColumnDef::new(Case::DocumentType).string().not_null())
                    .col(ColumnDef::new(Case::DocumentCount).integer().not_null())
                    .col(ColumnDef::new(Case::FolioCount).integer().not_null())
                    .col(ColumnDef::new(Case::Subject).text().not_null())
                    .col(
                        ColumnDef::new(Case::Status)
                            .string()
                            .not_null()
                            .default("PENDIENTE"),
                    )
                    .col(
                        ColumnDef::new(Case::PolicyAccepted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Case::PolicyAcceptedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Case::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Case::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Case::Table, Case::ExternalUserId)
                            .to(ExternalUser::Table, ExternalUser::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Last line of defence for the allocator.
        manager
            .create_index(
                Index::create()
                    .name("idx_cases_case_number_unique")
                    .table(Case::Table)
                    .col(Case::CaseNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cases_external_user")
                    .table(Case::Table)
                    .col(Case::ExternalUserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cases_status_created")
                    .table(Case::Table)
                    .col(Case::Status)
                    .col(Case::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Case::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Case {
    #[sea_orm(iden = "cases")]
    Table,
    Id,
    CaseNumber,
    ExternalUserId,
    DocumentType,
    DocumentCount,
    FolioCount,
    Subject,
    Status,
    PolicyAccepted,
    PolicyAcceptedAt,
    CreatedAt,
    UpdatedAt,
}
