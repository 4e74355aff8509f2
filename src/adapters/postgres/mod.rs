//! PostgreSQL adapters.
//!
//! Implements the persistence ports on sqlx. Every commit-unit method runs
//! in one database transaction, so the atomicity the ports promise holds
//! under concurrent writers and mid-call failures.

mod knowledge_store;
mod support_store;

pub use knowledge_store::PostgresKnowledgeStore;
pub use support_store::PostgresSupportStore;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

/// Builds a connection pool from the database configuration, optionally
/// running pending migrations.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await?;

    if config.run_migrations {
        info!("running pending database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    Ok(pool)
}
