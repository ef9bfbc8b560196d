//! Persistence for users and sessions.
//!
//! - [`models`] -- row types and DTOs.
//! - [`repositories`] -- raw SQL against a single pool.
//! - [`store`] -- the [`store::SessionStore`] / [`store::UserDirectory`] seams the
//!   API layer depends on, with Postgres and in-process implementations.

pub mod models;
pub mod repositories;
pub mod store;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Verify the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Primary pool for writes plus an optional read replica.
///
/// When no replica is configured every read falls back to the primary.
#[derive(Debug, Clone)]
pub struct DbPools {
    pub primary: DbPool,
    replica: Option<DbPool>,
}

impl DbPools {
    pub fn new(primary: DbPool, replica: Option<DbPool>) -> Self {
        Self { primary, replica }
    }

    /// Pool for read-only queries.
    pub fn reader(&self) -> &DbPool {
        self.replica.as_ref().unwrap_or(&self.primary)
    }

    /// Pool for inserts, updates and deletes.
    pub fn writer(&self) -> &DbPool {
        &self.primary
    }

    pub fn has_replica(&self) -> bool {
        self.replica.is_some()
    }
}
