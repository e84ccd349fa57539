//! PostgreSQL storage infrastructure

mod migrations;

pub use migrations::{run_storage_migrations, storage_migrations, Migration, PostgresMigrator};

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::domain::DomainError;

/// Connect to PostgreSQL with the given pool size
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<PgPool, DomainError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to database: {}", e)))?;

    tracing::info!(max_connections, "Connected to PostgreSQL");

    Ok(pool)
}
