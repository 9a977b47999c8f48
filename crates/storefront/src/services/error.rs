//! Service error taxonomy.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::store::StoreError;

/// Errors surfaced by the checkout and wallet services.
///
/// The first four kinds are decided before anything is written. `Internal`
/// covers storage failures; the unit of work is rolled back before it is
/// returned.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or missing caller input.
    #[error("{0}")]
    InvalidArgument(String),

    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Wallet balance is below the amount to debit.
    #[error("{0}")]
    InsufficientFunds(String),

    /// Not enough stock for a cart line. Names the offending product and size.
    #[error("{0}")]
    OutOfStock(String),

    /// Storage or transport failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("not found".to_owned()),
            RepositoryError::Conflict(message) => Self::InvalidArgument(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_timeout_is_internal() {
        let err = ServiceError::from(StoreError::Timeout);
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[test]
    fn test_business_errors_display_bare_message() {
        let err = ServiceError::OutOfStock("Samba OG (Size 42) is out of stock".to_owned());
        assert_eq!(err.to_string(), "Samba OG (Size 42) is out of stock");
    }
}
