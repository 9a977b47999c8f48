//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `STOREFRONT_DB_ACQUIRE_TIMEOUT_SECS` - Pool acquisition timeout (default: 10)
//! - `STOREFRONT_LOCK_TIMEOUT_MS` - Row-lock wait per checkout (default: 5000)
//! - `STOREFRONT_MAX_TOP_UP` - Largest single wallet top-up in baht (default: 50000)
//! - `STOREFRONT_LOG_JSON` - Emit JSON logs (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use kicks_core::Money;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    /// How long a checkout waits for a locked row before giving up
    pub lock_timeout: Duration,
    /// Largest single wallet top-up
    pub max_top_up: Money,
    /// Emit logs as JSON lines
    pub log_json: bool,
    pub sentry: SentryConfig,
}

/// Error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry DSN; error tracking is off when unset
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let database_url = env
            .get("STOREFRONT_DATABASE_URL")
            .or_else(|| env.get("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_owned()))?;

        let db_max_connections: u32 = env.parse_or("STOREFRONT_DB_MAX_CONNECTIONS", 10)?;
        if db_max_connections == 0 {
            return Err(invalid("STOREFRONT_DB_MAX_CONNECTIONS", "must be at least 1"));
        }

        let max_top_up = Money::new(env.parse_or("STOREFRONT_MAX_TOP_UP", Decimal::from(50_000))?);
        if !max_top_up.is_positive() {
            return Err(invalid("STOREFRONT_MAX_TOP_UP", "must be positive"));
        }

        Ok(Self {
            database_url,
            host: env.parse_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: env.parse_or("STOREFRONT_PORT", 3000)?,
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(
                env.parse_or("STOREFRONT_DB_ACQUIRE_TIMEOUT_SECS", 10)?,
            ),
            lock_timeout: Duration::from_millis(env.parse_or("STOREFRONT_LOCK_TIMEOUT_MS", 5000)?),
            max_top_up,
            log_json: env.flag("STOREFRONT_LOG_JSON")?,
            sentry: SentryConfig {
                dsn: env.get("SENTRY_DSN"),
                environment: env.get("SENTRY_ENVIRONMENT"),
                sample_rate: env.rate("SENTRY_SAMPLE_RATE", 1.0)?,
                traces_sample_rate: env.rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
            },
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_owned(), reason.into())
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// A set, non-blank variable.
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// Parse a variable, or use `default` when it is unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key).map_or(Ok(default), |raw| {
            raw.trim().parse::<T>().map_err(|e| invalid(key, e.to_string()))
        })
    }

    fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        match self.get(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("false" | "0" | "no") => Ok(false),
            Some("true" | "1" | "yes") => Ok(true),
            Some(other) => Err(invalid(key, format!("expected true or false, got {other}"))),
        }
    }

    fn rate(&self, key: &str, default: f32) -> Result<f32, ConfigError> {
        let rate: f32 = self.parse_or(key, default)?;
        if !(0.0..=1.0).contains(&rate) {
            return Err(invalid(key, "must be between 0.0 and 1.0"));
        }
        Ok(rate)
    }
}
