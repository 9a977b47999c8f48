//! Order history repository.
//!
//! Orders are only ever written by the checkout store; this side reads them.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kicks_core::{Money, OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderDetail, OrderFilter, OrderItem, OrderRef, OrderSummary};

#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    id: OrderId,
    order_number: String,
    user_id: UserId,
    username: String,
    total_amount: Money,
    status: OrderStatus,
    payment_method: PaymentMethod,
    item_count: i64,
    created_at: DateTime<Utc>,
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        Self {
            id: row.id,
            order_number: row.order_number,
            user_id: row.user_id,
            username: row.username,
            total_amount: row.total_amount,
            status: row.status,
            payment_method: row.payment_method,
            item_count: row.item_count,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    user_id: UserId,
    total_amount: Money,
    status: OrderStatus,
    payment_method: PaymentMethod,
    shipping_address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            order_number: row.order_number,
            user_id: row.user_id,
            total_amount: row.total_amount,
            status: row.status,
            payment_method: row.payment_method,
            shipping_address: row.shipping_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    product_name: String,
    size: Option<String>,
    quantity: i32,
    unit_price: Money,
    subtotal: Money,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            size: row.size,
            quantity: row.quantity,
            unit_price: row.unit_price,
            subtotal: row.subtotal,
        }
    }
}

/// Repository for order reads.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List order summaries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(
            r"
            SELECT o.id, o.order_number, o.user_id, u.username, o.total_amount,
                   o.status, o.payment_method, o.created_at,
                   (SELECT COUNT(*) FROM storefront.order_items i WHERE i.order_id = o.id)
                       AS item_count
            FROM storefront.orders o
            JOIN storefront.users u ON u.id = o.user_id
            WHERE ($1::integer IS NULL OR o.user_id = $1)
              AND ($2::storefront.order_status IS NULL OR o.status = $2)
              AND ($3::timestamptz IS NULL OR o.created_at >= $3)
            ORDER BY o.created_at DESC, o.id DESC
            ",
        )
        .bind(filter.user_id)
        .bind(filter.status)
        .bind(filter.window.since(now))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderSummary::from).collect())
    }

    /// Get an order and its line items by id or order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(
        &self,
        order_ref: &OrderRef,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        const ORDER_SELECT: &str = "SELECT id, order_number, user_id, total_amount, status, \
                                    payment_method, shipping_address, created_at, updated_at \
                                    FROM storefront.orders";

        let row = match order_ref {
            OrderRef::Id(id) => {
                sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE id = $1"))
                    .bind(*id)
                    .fetch_optional(self.pool)
                    .await?
            }
            OrderRef::Number(number) => {
                sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE order_number = $1"))
                    .bind(number)
                    .fetch_optional(self.pool)
                    .await?
            }
        };

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_id, product_name, size, quantity, unit_price, subtotal
            FROM storefront.order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail {
            order: Order::from(row),
            items: items.into_iter().map(OrderItem::from).collect(),
        }))
    }
}
