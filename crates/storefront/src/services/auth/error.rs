//! Authentication error types.

use thiserror::Error;

use kicks_core::{EmailError, UsernameError};

use crate::db::RepositoryError;

/// Errors that can occur during registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("{0}")]
    InvalidEmail(#[from] EmailError),

    /// Wrong password or unknown username. Deliberately indistinguishable.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username already taken")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("{0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
