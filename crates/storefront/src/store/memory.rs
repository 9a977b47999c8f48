//! In-memory checkout store.
//!
//! Transactions are serialised behind one async mutex. A transaction works on
//! a private copy of the data and writes it back on commit, so an error or an
//! early drop leaves the shared state untouched. [`FailPoint`] makes a chosen
//! primitive fail, to exercise rollback paths without a database.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use kicks_core::{Money, OrderId, OrderStatus, ProductId, UserId};

use super::{CheckoutStore, CheckoutTx, StoreError};
use crate::models::{NewNotification, NewOrder, NewOrderItem, OrderHeader, StockedProduct};

/// A primitive that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Begin,
    LockUser,
    LockProduct,
    LockSize,
    TakeProductStock,
    TakeSizeStock,
    DebitBalance,
    CreditBalance,
    InsertOrder,
    InsertOrderItem,
    InsertNotification,
    LockOrder,
    SetOrderStatus,
    Commit,
}

/// An order as recorded by the memory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryOrder {
    pub id: OrderId,
    pub header: NewOrder,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
struct MemoryProduct {
    name: String,
    price: Money,
    stock: i32,
    is_active: bool,
    sizes: BTreeMap<String, i32>,
}

#[derive(Debug, Clone, Default)]
struct MemoryData {
    users: HashMap<UserId, Money>,
    products: HashMap<ProductId, MemoryProduct>,
    orders: Vec<MemoryOrder>,
    notifications: Vec<NewNotification>,
    next_user_id: i32,
    next_product_id: i32,
    next_order_id: i32,
}

impl MemoryData {
    fn order_mut(&mut self, id: OrderId) -> Option<&mut MemoryOrder> {
        self.orders.iter_mut().find(|o| o.id == id)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    data: MemoryData,
    fail_point: Option<FailPoint>,
}

// =============================================================================
// Store
// =============================================================================

/// Checkout store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckoutStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryCheckoutStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user with the given wallet balance.
    pub async fn add_user(&self, balance: Money) -> UserId {
        let mut state = self.state.lock().await;
        state.data.next_user_id += 1;
        let id = UserId::new(state.data.next_user_id);
        state.data.users.insert(id, balance);
        id
    }

    /// Add an active product without sizes.
    pub async fn add_product(&self, name: &str, price: Money, stock: i32) -> ProductId {
        self.insert_product(name, price, stock, BTreeMap::new()).await
    }

    /// Add an active product with per-size stock. Aggregate stock is the sum.
    pub async fn add_sized_product(
        &self,
        name: &str,
        price: Money,
        sizes: &[(&str, i32)],
    ) -> ProductId {
        let sizes: BTreeMap<String, i32> = sizes
            .iter()
            .map(|(size, stock)| ((*size).to_owned(), *stock))
            .collect();
        let stock = sizes.values().sum();
        self.insert_product(name, price, stock, sizes).await
    }

    async fn insert_product(
        &self,
        name: &str,
        price: Money,
        stock: i32,
        sizes: BTreeMap<String, i32>,
    ) -> ProductId {
        let mut state = self.state.lock().await;
        state.data.next_product_id += 1;
        let id = ProductId::new(state.data.next_product_id);
        state.data.products.insert(
            id,
            MemoryProduct {
                name: name.to_owned(),
                price,
                stock,
                is_active: true,
                sizes,
            },
        );
        id
    }

    /// Hide or restore a product.
    pub async fn set_active(&self, product_id: ProductId, is_active: bool) {
        if let Some(product) = self.state.lock().await.data.products.get_mut(&product_id) {
            product.is_active = is_active;
        }
    }

    /// Make every transaction fail when it reaches `point`, until cleared.
    pub async fn fail_at(&self, point: FailPoint) {
        self.state.lock().await.fail_point = Some(point);
    }

    pub async fn clear_failure(&self) {
        self.state.lock().await.fail_point = None;
    }

    /// Committed wallet balance.
    pub async fn balance(&self, user_id: UserId) -> Option<Money> {
        self.state.lock().await.data.users.get(&user_id).copied()
    }

    /// Committed aggregate stock.
    pub async fn stock(&self, product_id: ProductId) -> Option<i32> {
        self.state
            .lock()
            .await
            .data
            .products
            .get(&product_id)
            .map(|p| p.stock)
    }

    /// Committed stock of one size.
    pub async fn size_stock(&self, product_id: ProductId, size: &str) -> Option<i32> {
        self.state
            .lock()
            .await
            .data
            .products
            .get(&product_id)
            .and_then(|p| p.sizes.get(size).copied())
    }

    /// Committed orders, oldest first.
    pub async fn orders(&self) -> Vec<MemoryOrder> {
        self.state.lock().await.data.orders.clone()
    }

    /// Committed status of an order.
    pub async fn order_status(&self, order_id: OrderId) -> Option<OrderStatus> {
        self.state
            .lock()
            .await
            .data
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.header.status)
    }

    /// Committed notifications for a user, oldest first.
    pub async fn notifications(&self, user_id: UserId) -> Vec<NewNotification> {
        self.state
            .lock()
            .await
            .data
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CheckoutStore for MemoryCheckoutStore {
    async fn begin(&self) -> Result<Box<dyn CheckoutTx>, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        if guard.fail_point == Some(FailPoint::Begin) {
            return Err(injected(FailPoint::Begin));
        }
        let working = guard.data.clone();
        Ok(Box::new(MemoryCheckoutTx { guard, working }))
    }
}

fn injected(point: FailPoint) -> StoreError {
    StoreError::Unavailable(format!("injected failure at {point:?}"))
}

/// A memory transaction. Holds the store lock until committed or dropped.
pub struct MemoryCheckoutTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryData,
}

impl MemoryCheckoutTx {
    fn check(&self, point: FailPoint) -> Result<(), StoreError> {
        if self.guard.fail_point == Some(point) {
            return Err(injected(point));
        }
        Ok(())
    }
}

#[async_trait]
impl CheckoutTx for MemoryCheckoutTx {
    async fn lock_user(&mut self, user_id: UserId) -> Result<Option<Money>, StoreError> {
        self.check(FailPoint::LockUser)?;
        Ok(self.working.users.get(&user_id).copied())
    }

    async fn lock_product(
        &mut self,
        product_id: ProductId,
    ) -> Result<Option<StockedProduct>, StoreError> {
        self.check(FailPoint::LockProduct)?;
        Ok(self
            .working
            .products
            .get(&product_id)
            .map(|p| StockedProduct {
                id: product_id,
                name: p.name.clone(),
                price: p.price,
                stock: p.stock,
                is_active: p.is_active,
                has_sizes: !p.sizes.is_empty(),
            }))
    }

    async fn lock_size(
        &mut self,
        product_id: ProductId,
        size: &str,
    ) -> Result<Option<i32>, StoreError> {
        self.check(FailPoint::LockSize)?;
        Ok(self
            .working
            .products
            .get(&product_id)
            .and_then(|p| p.sizes.get(size).copied()))
    }

    async fn take_product_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, StoreError> {
        self.check(FailPoint::TakeProductStock)?;
        match self.working.products.get_mut(&product_id) {
            Some(product) if product.stock >= quantity => {
                product.stock -= quantity;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn take_size_stock(
        &mut self,
        product_id: ProductId,
        size: &str,
        quantity: i32,
    ) -> Result<bool, StoreError> {
        self.check(FailPoint::TakeSizeStock)?;
        let stock = self
            .working
            .products
            .get_mut(&product_id)
            .and_then(|p| p.sizes.get_mut(size));
        match stock {
            Some(stock) if *stock >= quantity => {
                *stock -= quantity;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn debit_balance(
        &mut self,
        user_id: UserId,
        amount: Money,
    ) -> Result<Option<Money>, StoreError> {
        self.check(FailPoint::DebitBalance)?;
        match self.working.users.get_mut(&user_id) {
            Some(balance) if *balance >= amount => {
                *balance = *balance - amount;
                Ok(Some(*balance))
            }
            _ => Ok(None),
        }
    }

    async fn credit_balance(
        &mut self,
        user_id: UserId,
        amount: Money,
    ) -> Result<Option<Money>, StoreError> {
        self.check(FailPoint::CreditBalance)?;
        Ok(self.working.users.get_mut(&user_id).map(|balance| {
            *balance = *balance + amount;
            *balance
        }))
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId, StoreError> {
        self.check(FailPoint::InsertOrder)?;
        if self
            .working
            .orders
            .iter()
            .any(|o| o.header.order_number == order.order_number)
        {
            return Err(StoreError::Unavailable(format!(
                "duplicate order number {}",
                order.order_number
            )));
        }
        self.working.next_order_id += 1;
        let id = OrderId::new(self.working.next_order_id);
        self.working.orders.push(MemoryOrder {
            id,
            header: order.clone(),
            items: Vec::new(),
        });
        Ok(id)
    }

    async fn insert_order_item(
        &mut self,
        order_id: OrderId,
        item: &NewOrderItem,
    ) -> Result<(), StoreError> {
        self.check(FailPoint::InsertOrderItem)?;
        let order = self
            .working
            .order_mut(order_id)
            .ok_or_else(|| StoreError::Unavailable(format!("no order {order_id}")))?;
        order.items.push(item.clone());
        Ok(())
    }

    async fn insert_notification(
        &mut self,
        notification: &NewNotification,
    ) -> Result<(), StoreError> {
        self.check(FailPoint::InsertNotification)?;
        self.working.notifications.push(notification.clone());
        Ok(())
    }

    async fn lock_order(&mut self, order_id: OrderId) -> Result<Option<OrderHeader>, StoreError> {
        self.check(FailPoint::LockOrder)?;
        Ok(self
            .working
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| OrderHeader {
                id: o.id,
                user_id: o.header.user_id,
                order_number: o.header.order_number.clone(),
                status: o.header.status,
            }))
    }

    async fn set_order_status(
        &mut self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        self.check(FailPoint::SetOrderStatus)?;
        if let Some(order) = self.working.order_mut(order_id) {
            order.header.status = status;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.check(FailPoint::Commit)?;
        let Self { mut guard, working } = *self;
        guard.data = working;
        Ok(())
    }
}
