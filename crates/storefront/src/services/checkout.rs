//! Order placement and status updates.
//!
//! [`OrderService::place_order`] runs the whole checkout inside one
//! [`CheckoutTx`]: locks are taken, every check is evaluated, and only then are
//! stock, wallet, order rows and the notification written. Any error drops the
//! transaction and leaves the store exactly as it was.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::{info, instrument, warn};

use kicks_core::{Money, OrderId, OrderStatus, ProductId};

use super::ServiceError;
use crate::models::{
    CartItem, NewNotification, NewOrder, NewOrderItem, OrderHeader, PlaceOrder, PlacedOrder,
    StockedProduct,
};
use crate::store::{CheckoutStore, CheckoutTx};

/// Length of the random suffix on order numbers.
const ORDER_SUFFIX_LEN: usize = 4;

// =============================================================================
// Cart Planning
// =============================================================================

/// A validated cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CartLine {
    product_id: ProductId,
    quantity: i32,
    client_price: Money,
    size: Option<String>,
}

/// Validate a cart before touching storage.
fn validate_cart(request: &PlaceOrder) -> Result<Vec<CartLine>, ServiceError> {
    if request.items.is_empty() {
        return Err(ServiceError::invalid("cart is empty"));
    }
    if request.shipping_address.trim().is_empty() {
        return Err(ServiceError::invalid("shipping address is required"));
    }

    request.items.iter().map(validate_line).collect()
}

fn validate_line(item: &CartItem) -> Result<CartLine, ServiceError> {
    if item.quantity == 0 {
        return Err(ServiceError::invalid(format!(
            "quantity for product {} must be positive",
            item.product_id
        )));
    }
    let quantity = i32::try_from(item.quantity).map_err(|_| {
        ServiceError::invalid(format!("quantity for product {} is too large", item.product_id))
    })?;
    if !item.unit_price.is_positive() {
        return Err(ServiceError::invalid(format!(
            "price for product {} must be positive",
            item.product_id
        )));
    }

    Ok(CartLine {
        product_id: item.product_id,
        quantity,
        client_price: item.unit_price,
        size: item.size().map(str::to_owned),
    })
}

/// Requested quantities summed per product and per size.
///
/// Keys are ordered, which fixes the order locks are taken in.
#[derive(Debug, Default, PartialEq, Eq)]
struct Demand {
    products: BTreeMap<ProductId, i32>,
    sizes: BTreeMap<(ProductId, String), i32>,
}

impl Demand {
    fn of(lines: &[CartLine]) -> Result<Self, ServiceError> {
        let mut demand = Self::default();
        for line in lines {
            add_demand(&mut demand.products, line.product_id, line.quantity)?;
            if let Some(size) = &line.size {
                add_demand(
                    &mut demand.sizes,
                    (line.product_id, size.clone()),
                    line.quantity,
                )?;
            }
        }
        Ok(demand)
    }
}

fn add_demand<K: Ord>(
    map: &mut BTreeMap<K, i32>,
    key: K,
    quantity: i32,
) -> Result<(), ServiceError> {
    let total = map.entry(key).or_insert(0);
    *total = total
        .checked_add(quantity)
        .ok_or_else(|| ServiceError::invalid("requested quantity is too large"))?;
    Ok(())
}

/// Line item snapshot name: catalog name plus the size, if any.
fn snapshot_name(product_name: &str, size: Option<&str>) -> String {
    match size {
        Some(size) => format!("{product_name} (Size {size})"),
        None => product_name.to_owned(),
    }
}

/// Generate a human-readable order number: `ORD-<UTC millis>-<suffix>`.
///
/// The suffix separates orders placed in the same millisecond; the `UNIQUE`
/// constraint on `order_number` catches whatever it does not.
#[must_use]
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(ORDER_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("ORD-{}-{suffix}", now.format("%Y%m%d%H%M%S%3f"))
}

// =============================================================================
// Service
// =============================================================================

/// Checkout and order status operations over a [`CheckoutStore`].
pub struct OrderService<'a> {
    store: &'a dyn CheckoutStore,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(store: &'a dyn CheckoutStore) -> Self {
        Self { store }
    }

    /// Place an order as one atomic unit.
    ///
    /// Prices come from the catalog. The client's unit prices and total are
    /// only compared against them.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty cart, a non-positive quantity or
    ///   price, a blank address, a missing size on a product sold by size, or
    ///   a price or total that no longer matches
    /// - `NotFound` if the user or an active product does not exist
    /// - `InsufficientFunds` if store credit does not cover the total
    /// - `OutOfStock` if any product or size cannot cover its demand
    /// - `Internal` on storage failure; nothing is written
    #[instrument(
        skip(self, request),
        fields(user_id = %request.user_id, payment_method = %request.payment_method)
    )]
    pub async fn place_order(&self, request: &PlaceOrder) -> Result<PlacedOrder, ServiceError> {
        let lines = validate_cart(request)?;
        let demand = Demand::of(&lines)?;

        let mut tx = self.store.begin().await?;

        let balance = tx
            .lock_user(request.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("user {} not found", request.user_id)))?;

        let products = lock_products(tx.as_mut(), &demand).await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = products.get(&line.product_id).ok_or_else(|| {
                ServiceError::not_found(format!("product {} not found", line.product_id))
            })?;
            if product.has_sizes && line.size.is_none() {
                return Err(ServiceError::invalid(format!(
                    "select a size for {}",
                    product.name
                )));
            }
            if !line.client_price.approx_eq(product.price) {
                return Err(ServiceError::invalid(format!(
                    "price of {} changed to {}",
                    product.name, product.price
                )));
            }
            items.push(NewOrderItem {
                product_id: product.id,
                product_name: snapshot_name(&product.name, line.size.as_deref()),
                size: line.size.clone(),
                quantity: line.quantity,
                unit_price: product.price,
                subtotal: product.price.times(line.quantity.unsigned_abs()),
            });
        }

        let total: Money = items.iter().map(|item| item.subtotal).sum();
        if let Some(client_total) = request.total_amount
            && !client_total.approx_eq(total)
        {
            return Err(ServiceError::invalid(format!(
                "order total {client_total} does not match {total}"
            )));
        }

        let uses_credit = request.payment_method.uses_store_credit();
        if uses_credit && balance < total {
            return Err(ServiceError::InsufficientFunds(format!(
                "insufficient store credit: balance {balance}, order total {total}"
            )));
        }

        check_stock(tx.as_mut(), &demand, &products).await?;

        let order = NewOrder {
            order_number: generate_order_number(Utc::now()),
            user_id: request.user_id,
            total_amount: total,
            status: request.payment_method.initial_order_status(),
            payment_method: request.payment_method,
            shipping_address: request.shipping_address.trim().to_owned(),
        };
        let order_id = tx.insert_order(&order).await?;
        for item in &items {
            tx.insert_order_item(order_id, item).await?;
        }

        take_stock(tx.as_mut(), &demand, &products).await?;

        let new_balance = if uses_credit {
            let balance = tx
                .debit_balance(request.user_id, total)
                .await?
                .ok_or_else(|| {
                    ServiceError::InsufficientFunds("insufficient store credit".to_owned())
                })?;
            Some(balance)
        } else {
            None
        };

        tx.insert_notification(&NewNotification::order_placed(
            request.user_id,
            &order.order_number,
        ))
        .await?;
        tx.commit().await?;

        info!(
            order_id = %order_id,
            order_number = %order.order_number,
            total = %total,
            "Order placed"
        );

        Ok(PlacedOrder {
            order_id,
            order_number: order.order_number,
            status: order.status,
            total_amount: total,
            new_balance,
        })
    }

    /// Set an order's status and notify its owner.
    ///
    /// Repeating the current status is allowed and notifies again. No stock or
    /// wallet changes are made.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `status` is not a known status
    /// - `NotFound` if the order does not exist
    /// - `Internal` on storage failure
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: &str,
    ) -> Result<OrderHeader, ServiceError> {
        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| ServiceError::invalid(e.to_string()))?;

        let mut tx = self.store.begin().await?;
        let mut order = tx
            .lock_order(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("order {order_id} not found")))?;

        tx.set_order_status(order_id, status).await?;
        tx.insert_notification(&NewNotification::order_status_changed(
            order.user_id,
            &order.order_number,
            status,
        ))
        .await?;
        tx.commit().await?;

        info!(
            order_number = %order.order_number,
            from = %order.status,
            to = %status,
            "Order status updated"
        );
        order.status = status;
        Ok(order)
    }
}

/// Lock every product in the cart, by ascending id.
async fn lock_products(
    tx: &mut dyn CheckoutTx,
    demand: &Demand,
) -> Result<BTreeMap<ProductId, StockedProduct>, ServiceError> {
    let mut products = BTreeMap::new();
    for &product_id in demand.products.keys() {
        let product = tx
            .lock_product(product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| ServiceError::not_found(format!("product {product_id} not found")))?;
        products.insert(product_id, product);
    }
    Ok(products)
}

fn product_name(products: &BTreeMap<ProductId, StockedProduct>, id: ProductId) -> String {
    products
        .get(&id)
        .map_or_else(|| format!("product {id}"), |p| p.name.clone())
}

/// Check every product and size against its summed demand. Locks size rows.
async fn check_stock(
    tx: &mut dyn CheckoutTx,
    demand: &Demand,
    products: &BTreeMap<ProductId, StockedProduct>,
) -> Result<(), ServiceError> {
    for (product_id, &wanted) in &demand.products {
        let available = products.get(product_id).map_or(0, |p| p.stock);
        if available < wanted {
            return Err(ServiceError::OutOfStock(format!(
                "{} is out of stock (requested {wanted}, available {available})",
                product_name(products, *product_id)
            )));
        }
    }

    for ((product_id, size), &wanted) in &demand.sizes {
        let name = snapshot_name(&product_name(products, *product_id), Some(size));
        match tx.lock_size(*product_id, size).await? {
            None => {
                return Err(ServiceError::OutOfStock(format!("{name} is not available")));
            }
            Some(available) if available < wanted => {
                return Err(ServiceError::OutOfStock(format!(
                    "{name} is out of stock (requested {wanted}, available {available})"
                )));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Decrement size and aggregate stock together.
async fn take_stock(
    tx: &mut dyn CheckoutTx,
    demand: &Demand,
    products: &BTreeMap<ProductId, StockedProduct>,
) -> Result<(), ServiceError> {
    for ((product_id, size), &quantity) in &demand.sizes {
        if !tx.take_size_stock(*product_id, size, quantity).await? {
            warn!(product_id = %product_id, size = %size, "Size stock moved after check");
            return Err(ServiceError::OutOfStock(format!(
                "{} is out of stock",
                snapshot_name(&product_name(products, *product_id), Some(size))
            )));
        }
    }
    for (product_id, &quantity) in &demand.products {
        if !tx.take_product_stock(*product_id, quantity).await? {
            warn!(product_id = %product_id, "Product stock moved after check");
            return Err(ServiceError::OutOfStock(format!(
                "{} is out of stock",
                product_name(products, *product_id)
            )));
        }
    }
    Ok(())
}
