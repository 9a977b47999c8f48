//! Store-credit wallet.

use tracing::{info, instrument};

use kicks_core::{Money, UserId};

use super::ServiceError;
use crate::models::NewNotification;
use crate::store::CheckoutStore;

/// Wallet top-up and debit over a [`CheckoutStore`].
pub struct WalletService<'a> {
    store: &'a dyn CheckoutStore,
    max_top_up: Money,
}

impl<'a> WalletService<'a> {
    /// Create a new wallet service with the given top-up ceiling.
    #[must_use]
    pub const fn new(store: &'a dyn CheckoutStore, max_top_up: Money) -> Self {
        Self { store, max_top_up }
    }

    /// Add credit to a wallet and notify the user. Returns the new balance.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `amount` is not positive or exceeds the ceiling
    /// - `NotFound` if the user does not exist
    /// - `Internal` on storage failure
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn top_up(&self, user_id: UserId, amount: Money) -> Result<Money, ServiceError> {
        if !amount.is_positive() {
            return Err(ServiceError::invalid("amount must be positive"));
        }
        if amount > self.max_top_up {
            return Err(ServiceError::invalid(format!(
                "top-up cannot exceed {}",
                self.max_top_up
            )));
        }

        let mut tx = self.store.begin().await?;
        let balance = tx
            .credit_balance(user_id, amount)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("user {user_id} not found")))?;
        tx.insert_notification(&NewNotification::wallet_topped_up(user_id, amount))
            .await?;
        tx.commit().await?;

        info!(new_balance = %balance, "Wallet topped up");
        Ok(balance)
    }

    /// Debit a wallet in one conditional decrement. Returns the new balance.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `amount` is not positive
    /// - `NotFound` if the user does not exist
    /// - `InsufficientFunds` if the balance is below `amount`
    /// - `Internal` on storage failure
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn debit(&self, user_id: UserId, amount: Money) -> Result<Money, ServiceError> {
        if !amount.is_positive() {
            return Err(ServiceError::invalid("amount must be positive"));
        }

        let mut tx = self.store.begin().await?;
        let Some(balance) = tx.debit_balance(user_id, amount).await? else {
            return match tx.lock_user(user_id).await? {
                None => Err(ServiceError::not_found(format!("user {user_id} not found"))),
                Some(balance) => Err(ServiceError::InsufficientFunds(format!(
                    "insufficient store credit: balance {balance}, requested {amount}"
                ))),
            };
        };
        tx.commit().await?;

        info!(new_balance = %balance, "Wallet debited");
        Ok(balance)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{FailPoint, MemoryCheckoutStore};

    fn baht(amount: i64) -> Money {
        Money::from_satang(amount * 100)
    }

    #[tokio::test]
    async fn test_top_up_credits_and_notifies() {
        let store = MemoryCheckoutStore::new();
        let user = store.add_user(baht(100)).await;
        let wallet = WalletService::new(&store, baht(50_000));

        let balance = wallet.top_up(user, baht(500)).await.unwrap();

        assert_eq!(balance, baht(600));
        assert_eq!(store.balance(user).await, Some(baht(600)));
        let notifications = store.notifications(user).await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications.first().unwrap().title, "Wallet topped up");
    }

    #[tokio::test]
    async fn test_top_up_validates_amount() {
        let store = MemoryCheckoutStore::new();
        let user = store.add_user(Money::ZERO).await;
        let wallet = WalletService::new(&store, baht(50_000));

        for amount in [Money::ZERO, baht(-5), baht(50_001)] {
            let err = wallet.top_up(user, amount).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidArgument(_)));
        }
        assert!(wallet.top_up(user, baht(50_000)).await.is_ok());
    }

    #[tokio::test]
    async fn test_top_up_unknown_user() {
        let store = MemoryCheckoutStore::new();
        let wallet = WalletService::new(&store, baht(50_000));

        let err = wallet.top_up(UserId::new(99), baht(10)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_debit_distinguishes_missing_user_from_low_balance() {
        let store = MemoryCheckoutStore::new();
        let user = store.add_user(baht(100)).await;
        let wallet = WalletService::new(&store, baht(50_000));

        let err = wallet.debit(user, baht(101)).await.unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientFunds(_)));
        let err = wallet.debit(UserId::new(99), baht(1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        assert_eq!(wallet.debit(user, baht(100)).await.unwrap(), Money::ZERO);
    }

    #[tokio::test]
    async fn test_failed_notification_rolls_back_credit() {
        let store = MemoryCheckoutStore::new();
        let user = store.add_user(baht(100)).await;
        store.fail_at(FailPoint::InsertNotification).await;
        let wallet = WalletService::new(&store, baht(50_000));

        let err = wallet.top_up(user, baht(500)).await.unwrap_err();

        assert!(matches!(err, ServiceError::Internal(_)));
        assert_eq!(store.balance(user).await, Some(baht(100)));
    }
}
