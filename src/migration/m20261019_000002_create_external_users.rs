//! Create external_users table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExternalUser::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExternalUser::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExternalUser::Dni)
                            .string_len(8)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ExternalUser::Email).string().not_null())
                    .col(ColumnDef::new(ExternalUser::FirstNames).string().not_null())
                    .col(ColumnDef::new(ExternalUser::LastNames).string().not_null())
                    .col(ColumnDef::new(ExternalUser::Phone).string())
                    .col(
                        ColumnDef::new(ExternalUser::EmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ExternalUser::VerificationCode).string_len(6))
                    .col(
                        ColumnDef::new(ExternalUser::VerificationExpiresAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(ExternalUser::VerifiedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ExternalUser::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ExternalUser::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExternalUser::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ExternalUser {
    #[sea_orm(iden = "external_users")]
    Table,
    Id,
    Dni,
    Email,
    FirstNames,
    LastNames,
    Phone,
    EmailVerified,
    VerificationCode,
    VerificationExpiresAt,
    VerifiedAt,
    CreatedAt,
    UpdatedAt,
}
