//! Create administrators table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Administrator::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Administrator::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Administrator::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Administrator::PasswordHash)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Administrator::FirstNames)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Administrator::LastNames).string().not_null())
                    .col(
                        ColumnDef::new(Administrator::Role)
                            .string()
                            .not_null()
                            .default("OPERADOR"),
                    )
                    .col(
                        ColumnDef::new(Administrator::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Administrator::LastLoginAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Administrator::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Administrator::UpdatedAt)
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
            .drop_table(Table::drop().table(Administrator::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Administrator {
    #[sea_orm(iden = "administrators")]
    Table,
    Id,
    Email,
    PasswordHash,
    FirstNames,
    LastNames,
    Role,
    Active,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}
