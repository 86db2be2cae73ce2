//! Create case_sequences table (per-year case number counter).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CaseSequence::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CaseSequence::Year)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CaseSequence::LastValue)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CaseSequence::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CaseSequence {
    #[sea_orm(iden = "case_sequences")]
    Table,
    Year,
    LastValue,
}
