//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;
pub mod wallet;

use kicks_storefront::config::{ConfigError, StorefrontConfig};
use kicks_storefront::db::{self, PoolOptions, RepositoryError};
use kicks_storefront::services::ServiceError;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("Could not read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog: {0}")]
    Catalog(String),

    #[error("No user named {0}")]
    UnknownUser(String),
}

/// Load configuration and connect to the storefront database.
async fn connect() -> Result<(StorefrontConfig, PgPool), CommandError> {
    let config = StorefrontConfig::from_env()?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(
        &config.database_url,
        PoolOptions {
            max_connections: 2,
            acquire_timeout: config.db_acquire_timeout,
        },
    )
    .await?;

    Ok((config, pool))
}
