//! Checkout store: the transactional unit of work behind orders and wallets.
//!
//! Everything that changes more than one row that must stay consistent goes
//! through a [`CheckoutTx`]: stock, size stock, wallet balances, orders,
//! order lines, and the notification that announces them. A transaction is
//! all-or-nothing. Writes become visible on [`CheckoutTx::commit`]; dropping
//! the transaction without committing discards them.
//!
//! # Implementations
//!
//! - [`PgCheckoutStore`] - one `PostgreSQL` transaction per unit of work, with
//!   row locks and conditional decrements
//! - [`MemoryCheckoutStore`] - serialised in-memory store for tests and local
//!   development, with failure injection
//!
//! # Locking discipline
//!
//! Callers take locks in a fixed order to rule out deadlocks between
//! concurrent checkouts: the user row first, then product rows by ascending
//! id, then size rows. Order rows are only ever locked on their own.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use kicks_core::{Money, OrderId, OrderStatus, ProductId, UserId};

use crate::models::{NewNotification, NewOrder, NewOrderItem, OrderHeader, StockedProduct};

pub use memory::{FailPoint, MemoryCheckoutStore};
pub use postgres::PgCheckoutStore;

/// Errors raised by a checkout store.
///
/// Business outcomes (not enough stock, not enough credit) are not errors at
/// this level: the conditional primitives report them through their return
/// values and the service decides what they mean.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Lock or connection acquisition did not complete in time.
    #[error("storage timed out")]
    Timeout,

    /// Storage refused the operation (used by failure injection).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Opens units of work.
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// Begin a new unit of work.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if no transaction could be started.
    async fn begin(&self) -> Result<Box<dyn CheckoutTx>, StoreError>;
}

/// One all-or-nothing unit of work.
#[async_trait]
pub trait CheckoutTx: Send {
    /// Lock a user row and read its wallet balance. `None` if the user does
    /// not exist.
    async fn lock_user(&mut self, user_id: UserId) -> Result<Option<Money>, StoreError>;

    /// Lock a product row for the rest of the transaction and report whether
    /// it has size rows.
    async fn lock_product(
        &mut self,
        product_id: ProductId,
    ) -> Result<Option<StockedProduct>, StoreError>;

    /// Lock a size row and read its stock. `None` if the product has no such
    /// size.
    async fn lock_size(
        &mut self,
        product_id: ProductId,
        size: &str,
    ) -> Result<Option<i32>, StoreError>;

    /// Decrement aggregate stock if at least `quantity` remains.
    ///
    /// Returns `false`, changing nothing, when stock is insufficient.
    async fn take_product_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, StoreError>;

    /// Decrement one size's stock if at least `quantity` remains.
    ///
    /// Returns `false`, changing nothing, when stock is insufficient or the
    /// size does not exist.
    async fn take_size_stock(
        &mut self,
        product_id: ProductId,
        size: &str,
        quantity: i32,
    ) -> Result<bool, StoreError>;

    /// Debit a wallet in a single read-check-decrement.
    ///
    /// Returns the new balance, or `None` (changing nothing) when the user is
    /// missing or the balance is below `amount`.
    async fn debit_balance(
        &mut self,
        user_id: UserId,
        amount: Money,
    ) -> Result<Option<Money>, StoreError>;

    /// Credit a wallet. Returns the new balance, or `None` if the user is
    /// missing.
    async fn credit_balance(
        &mut self,
        user_id: UserId,
        amount: Money,
    ) -> Result<Option<Money>, StoreError>;

    /// Insert an order header.
    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId, StoreError>;

    /// Insert one frozen line item.
    async fn insert_order_item(
        &mut self,
        order_id: OrderId,
        item: &NewOrderItem,
    ) -> Result<(), StoreError>;

    /// Append a notification to a user's inbox.
    async fn insert_notification(&mut self, notification: &NewNotification)
    -> Result<(), StoreError>;

    /// Lock an order row. `None` if the order does not exist.
    async fn lock_order(&mut self, order_id: OrderId) -> Result<Option<OrderHeader>, StoreError>;

    /// Overwrite an order's status.
    async fn set_order_status(
        &mut self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), StoreError>;

    /// Make every write in this unit of work visible at once.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
