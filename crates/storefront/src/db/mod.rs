//! Read-side repositories for the storefront `PostgreSQL` database.
//!
//! # Schema: `storefront`
//!
//! ## Tables
//!
//! - `users` - Accounts, profile fields and the store-credit balance
//! - `products` / `product_sizes` - Catalog and per-size stock
//! - `orders` / `order_items` - Order headers and frozen line items
//! - `notifications` - Per-user inbox
//! - `user_favorites` - Saved products
//! - `contact_messages` - Contact form submissions
//!
//! Writes that must stay consistent with each other (stock, balances, orders)
//! go through [`crate::store`] instead.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p kicks-cli -- migrate
//! ```

pub mod contact;
pub mod favorites;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use contact::ContactRepository;
pub use favorites::FavoriteRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., username taken).
    #[error("{0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to `Conflict(message)`, anything else to `Database`.
    pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(err)
    }
}

/// Pool sizing.
#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &SecretString,
    options: PoolOptions,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(options.max_connections)
        .min_connections(options.max_connections.min(2))
        .acquire_timeout(options.acquire_timeout)
        .connect(database_url.expose_secret())
        .await
}
