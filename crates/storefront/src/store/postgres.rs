//! `PostgreSQL` checkout store.
//!
//! Each unit of work is a single transaction at `READ COMMITTED`. Rows are
//! locked with `SELECT ... FOR UPDATE` and every decrement is conditional
//! (`WHERE stock >= $n`, `WHERE credit_balance >= $n`), so two concurrent
//! checkouts can never both spend the same unit of stock or credit. A
//! per-transaction `lock_timeout` bounds how long a checkout waits on a busy
//! row.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use kicks_core::{Money, OrderId, OrderStatus, ProductId, UserId};

use super::{CheckoutStore, CheckoutTx, StoreError};
use crate::models::{NewNotification, NewOrder, NewOrderItem, OrderHeader, StockedProduct};

/// SQLSTATE for `lock_not_available`, raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct StockedProductRow {
    id: ProductId,
    name: String,
    price: Money,
    stock: i32,
    is_active: bool,
    has_sizes: bool,
}

impl From<StockedProductRow> for StockedProduct {
    fn from(row: StockedProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            is_active: row.is_active,
            has_sizes: row.has_sizes,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderHeaderRow {
    id: OrderId,
    user_id: UserId,
    order_number: String,
    status: OrderStatus,
}

impl From<OrderHeaderRow> for OrderHeader {
    fn from(row: OrderHeaderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            order_number: row.order_number,
            status: row.status,
        }
    }
}

/// Map sqlx errors, surfacing lock and pool timeouts as [`StoreError::Timeout`].
fn classify(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(LOCK_NOT_AVAILABLE) => {
            StoreError::Timeout
        }
        _ => StoreError::Database(err),
    }
}

// =============================================================================
// Store
// =============================================================================

/// Checkout store backed by the storefront database.
#[derive(Debug, Clone)]
pub struct PgCheckoutStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgCheckoutStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }
}

#[async_trait]
impl CheckoutStore for PgCheckoutStore {
    #[instrument(skip(self))]
    async fn begin(&self) -> Result<Box<dyn CheckoutTx>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        // SET does not accept bind parameters; the value is a plain integer.
        let statement = format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_timeout.as_millis()
        );
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;

        Ok(Box::new(PgCheckoutTx { tx }))
    }
}

/// An open checkout transaction. Rolled back by sqlx on drop unless committed.
pub struct PgCheckoutTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CheckoutTx for PgCheckoutTx {
    async fn lock_user(&mut self, user_id: UserId) -> Result<Option<Money>, StoreError> {
        sqlx::query_scalar::<_, Money>(
            r"
            SELECT credit_balance
            FROM storefront.users
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(classify)
    }

    async fn lock_product(
        &mut self,
        product_id: ProductId,
    ) -> Result<Option<StockedProduct>, StoreError> {
        let row = sqlx::query_as::<_, StockedProductRow>(
            r"
            SELECT
                p.id, p.name, p.price, p.stock, p.is_active,
                EXISTS (
                    SELECT 1 FROM storefront.product_sizes s WHERE s.product_id = p.id
                ) AS has_sizes
            FROM storefront.products p
            WHERE p.id = $1
            FOR UPDATE OF p
            ",
        )
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(classify)?;

        Ok(row.map(StockedProduct::from))
    }

    async fn lock_size(
        &mut self,
        product_id: ProductId,
        size: &str,
    ) -> Result<Option<i32>, StoreError> {
        sqlx::query_scalar::<_, i32>(
            r"
            SELECT stock
            FROM storefront.product_sizes
            WHERE product_id = $1 AND size = $2
            FOR UPDATE
            ",
        )
        .bind(product_id)
        .bind(size)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(classify)
    }

    async fn take_product_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.products
            SET stock = stock - $2, updated_at = now()
            WHERE id = $1 AND stock >= $2
            ",
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *self.tx)
        .await
        .map_err(classify)?;

        Ok(result.rows_affected() == 1)
    }

    async fn take_size_stock(
        &mut self,
        product_id: ProductId,
        size: &str,
        quantity: i32,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.product_sizes
            SET stock = stock - $3
            WHERE product_id = $1 AND size = $2 AND stock >= $3
            ",
        )
        .bind(product_id)
        .bind(size)
        .bind(quantity)
        .execute(&mut *self.tx)
        .await
        .map_err(classify)?;

        Ok(result.rows_affected() == 1)
    }

    async fn debit_balance(
        &mut self,
        user_id: UserId,
        amount: Money,
    ) -> Result<Option<Money>, StoreError> {
        sqlx::query_scalar::<_, Money>(
            r"
            UPDATE storefront.users
            SET credit_balance = credit_balance - $2, updated_at = now()
            WHERE id = $1 AND credit_balance >= $2
            RETURNING credit_balance
            ",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(classify)
    }

    async fn credit_balance(
        &mut self,
        user_id: UserId,
        amount: Money,
    ) -> Result<Option<Money>, StoreError> {
        sqlx::query_scalar::<_, Money>(
            r"
            UPDATE storefront.users
            SET credit_balance = credit_balance + $2, updated_at = now()
            WHERE id = $1
            RETURNING credit_balance
            ",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(classify)
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId, StoreError> {
        sqlx::query_scalar::<_, OrderId>(
            r"
            INSERT INTO storefront.orders
                (order_number, user_id, total_amount, status, payment_method, shipping_address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&order.order_number)
        .bind(order.user_id)
        .bind(order.total_amount)
        .bind(order.status)
        .bind(order.payment_method)
        .bind(&order.shipping_address)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(classify)
    }

    async fn insert_order_item(
        &mut self,
        order_id: OrderId,
        item: &NewOrderItem,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO storefront.order_items
                (order_id, product_id, product_name, size, quantity, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(item.size.as_deref())
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.subtotal)
        .execute(&mut *self.tx)
        .await
        .map_err(classify)?;

        Ok(())
    }

    async fn insert_notification(
        &mut self,
        notification: &NewNotification,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO storefront.notifications (user_id, title, message, kind)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind)
        .execute(&mut *self.tx)
        .await
        .map_err(classify)?;

        Ok(())
    }

    async fn lock_order(&mut self, order_id: OrderId) -> Result<Option<OrderHeader>, StoreError> {
        let row = sqlx::query_as::<_, OrderHeaderRow>(
            r"
            SELECT id, user_id, order_number, status
            FROM storefront.orders
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(order_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(classify)?;

        Ok(row.map(OrderHeader::from))
    }

    async fn set_order_status(
        &mut self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r"
            UPDATE storefront.orders
            SET status = $2, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(order_id)
        .bind(status)
        .execute(&mut *self.tx)
        .await
        .map_err(classify)?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(classify)
    }
}
