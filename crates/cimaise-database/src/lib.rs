//! # cimaise-database
//!
//! SQLite connection management, the migration runner, and the repositories
//! behind the plugin status table and site settings.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;

/// Connect an in-memory database with migrations applied. Used by tests
/// across the workspace.
pub async fn connect_in_memory() -> cimaise_core::AppResult<DatabasePool> {
    let config = cimaise_core::config::DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        ..Default::default()
    };
    let db = DatabasePool::connect(&config).await?;
    migration::run_migrations(db.pool()).await?;
    Ok(db)
}
