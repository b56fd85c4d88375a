//! PostgreSQL persistence for the PCRS validation service.
//!
//! Holds the `territoires` table and a [`TerritoryRegistry`] implementation
//! over it, used when perimeters are resolved against the database rather
//! than the on-disk territory index.
//!
//! [`TerritoryRegistry`]: pcrs_core::territory::TerritoryRegistry

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod registry;
pub mod repositories;

pub use registry::PgTerritoryRegistry;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
