//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_administrators;
mod m20261019_000002_create_external_users;
mod m20261019_000003_create_cases;
mod m20261019_000004_create_case_sequences;
mod m20261019_000005_create_attachments;
mod m20261019_000006_create_movements;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_administrators::Migration),
            Box::new(m20261019_000002_create_external_users::Migration),
            Box::new(m20261019_000003_create_cases::Migration),
            Box::new(m20261019_000004_create_case_sequences::Migration),
            Box::new(m20261019_000005_create_attachments::Migration),
            Box::new(m20261019_000006_create_movements::Migration),
        ]
    }
}
