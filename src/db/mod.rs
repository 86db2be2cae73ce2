//! Database module providing connection management, migrations, and queries.
//!
//! Read-only queries are methods on [`DbPool`]. Writes that must share a
//! transaction are free functions generic over [`sea_orm::ConnectionTrait`].

pub mod administrators;
pub mod attachments;
pub mod case_numbers;
pub mod cases;
pub mod external_users;
pub mod movements;

use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction,
    Statement, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use crate::config::DatabaseSettings;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

/// Shared SeaORM connection pool.
#[derive(Clone, Debug)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect using the configured database settings.
    pub async fn new(settings: &DatabaseSettings) -> AppResult<Self> {
        let mut options = ConnectOptions::new(settings.url.clone());
        options
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(Self { conn })
    }

    /// Wrap an existing connection (used by tests).
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Apply all pending migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Failed to run migrations: {}", e)))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Start a transaction.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.conn
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))
    }

    /// Round-trip a trivial query to check connectivity.
    pub async fn ping(&self) -> AppResult<()> {
        let stmt = Statement::from_string(self.conn.get_database_backend(), "SELECT 1".to_owned());
        self.conn
            .query_one_raw(stmt)
            .await
            .map_err(|e| AppError::Database(format!("Database ping failed: {}", e)))?;
        Ok(())
    }
}
