//! Create movements table.

use sea_orm_migration::prelude::*;

use super::m20261019_000001_create_administrators::Administrator;
use super::m20261019_000003_create_cases::Case;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movement::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Movement::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Movement::CaseId).uuid().not_null())
                    .col(ColumnDef::new(Movement::AdministratorId).uuid())
                    .col(ColumnDef::new(Movement::MovementType).string().not_null())
                    .col(ColumnDef::new(Movement::Description).text().not_null())
                    .col(
                        ColumnDef::new(Movement::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Movement::Table, Movement::CaseId)
                            .to(Case::Table, Case::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Movement::Table, Movement::AdministratorId)
                            .to(Administrator::Table, Administrator::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movements_case_created")
                    .table(Movement::Table)
                    .col(Movement::CaseId)
                    .col(Movement::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Movement::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Movement {
    #[sea_orm(iden = "movements")]
    Table,
    Id,
    CaseId,
    AdministratorId,
    MovementType,
    Description,
    CreatedAt,
}
