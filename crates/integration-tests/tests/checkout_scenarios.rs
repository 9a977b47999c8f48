//! End-to-end checkout outcomes: stock, wallet, order rows and notifications.

use kicks_core::{Money, OrderStatus, PaymentMethod};
use kicks_integration_tests::{baht, line, order, sized_line};
use kicks_storefront::services::{OrderService, ServiceError, WalletService};
use kicks_storefront::store::MemoryCheckoutStore;

#[tokio::test]
async fn test_store_credit_happy_path() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(baht(1_000)).await;
    let shoe = store.add_product("Air Max 90", baht(600), 5).await;

    let mut request = order(user, vec![line(shoe, 1, baht(600))], PaymentMethod::StoreCredit);
    request.total_amount = Some(baht(600));

    let placed = OrderService::new(&store).place_order(&request).await.unwrap();

    assert_eq!(placed.status, OrderStatus::Processing);
    assert_eq!(placed.total_amount, baht(600));
    assert_eq!(placed.new_balance, Some(baht(400)));
    assert!(placed.order_number.starts_with("ORD-"));
    assert_eq!(store.balance(user).await, Some(baht(400)));
    assert_eq!(store.stock(shoe).await, Some(4));

    let notifications = store.notifications(user).await;
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].message.contains(&placed.order_number));
}

#[tokio::test]
async fn test_insufficient_stock() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(baht(1_000)).await;
    let shoe = store.add_product("990v6", baht(600), 0).await;

    let request = order(user, vec![line(shoe, 1, baht(600))], PaymentMethod::StoreCredit);
    let err = OrderService::new(&store).place_order(&request).await.unwrap_err();

    assert!(matches!(err, ServiceError::OutOfStock(_)));
    assert_eq!(store.balance(user).await, Some(baht(1_000)));
    assert_eq!(store.stock(shoe).await, Some(0));
    assert!(store.orders().await.is_empty());
}

#[tokio::test]
async fn test_insufficient_balance() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(baht(100)).await;
    let shoe = store.add_product("Ultraboost Light", baht(600), 5).await;

    let request = order(user, vec![line(shoe, 1, baht(600))], PaymentMethod::StoreCredit);
    let err = OrderService::new(&store).place_order(&request).await.unwrap_err();

    assert!(matches!(err, ServiceError::InsufficientFunds(_)));
    assert_eq!(store.balance(user).await, Some(baht(100)));
    assert_eq!(store.stock(shoe).await, Some(5));
    assert!(store.orders().await.is_empty());
    assert!(store.notifications(user).await.is_empty());
}

#[tokio::test]
async fn test_cash_on_delivery_leaves_wallet_alone() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(baht(50)).await;
    let shoe = store.add_product("Chuck 70 Hi", baht(600), 2).await;

    let request = order(user, vec![line(shoe, 1, baht(600))], PaymentMethod::CashOnDelivery);
    let placed = OrderService::new(&store).place_order(&request).await.unwrap();

    assert_eq!(placed.status, OrderStatus::Pending);
    assert_eq!(placed.new_balance, None);
    assert_eq!(store.balance(user).await, Some(baht(50)));
    assert_eq!(store.stock(shoe).await, Some(1));
}

#[tokio::test]
async fn test_sized_item_moves_size_and_aggregate_stock_together() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(Money::ZERO).await;
    let shoe = store
        .add_sized_product("Gel-Kayano 30", baht(1_000), &[("41", 4), ("42", 6)])
        .await;

    let request = order(
        user,
        vec![sized_line(shoe, "42", 3, baht(1_000))],
        PaymentMethod::PromptPay,
    );
    OrderService::new(&store).place_order(&request).await.unwrap();

    assert_eq!(store.stock(shoe).await, Some(7));
    assert_eq!(store.size_stock(shoe, "42").await, Some(3));
    assert_eq!(store.size_stock(shoe, "41").await, Some(4));

    let orders = store.orders().await;
    let item = &orders[0].items[0];
    assert_eq!(item.product_name, "Gel-Kayano 30 (Size 42)");
    assert_eq!(item.size.as_deref(), Some("42"));
}

#[tokio::test]
async fn test_missing_size_is_out_of_stock() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(Money::ZERO).await;
    let shoe = store
        .add_sized_product("Air Max 90", baht(1_000), &[("42", 6)])
        .await;

    let request = order(
        user,
        vec![sized_line(shoe, "47", 1, baht(1_000))],
        PaymentMethod::CashOnDelivery,
    );
    let err = OrderService::new(&store).place_order(&request).await.unwrap_err();
    assert!(matches!(err, ServiceError::OutOfStock(ref m) if m.contains("47")));
}

#[tokio::test]
async fn test_unsized_line_on_sized_product_is_refused() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(Money::ZERO).await;
    let shoe = store
        .add_sized_product("Samba OG", baht(1_000), &[("42", 2), ("43", 1)])
        .await;

    let request = order(user, vec![line(shoe, 2, baht(1_000))], PaymentMethod::CashOnDelivery);
    let err = OrderService::new(&store).place_order(&request).await.unwrap_err();

    assert!(matches!(err, ServiceError::InvalidArgument(ref m) if m == "select a size for Samba OG"));
    assert_eq!(store.stock(shoe).await, Some(3));
    assert_eq!(store.size_stock(shoe, "42").await, Some(2));
    assert_eq!(store.size_stock(shoe, "43").await, Some(1));
    assert!(store.orders().await.is_empty());
}

#[tokio::test]
async fn test_lines_for_same_product_are_checked_together() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(Money::ZERO).await;
    let shoe = store
        .add_sized_product("990v6", baht(2_000), &[("42", 2), ("43", 2)])
        .await;

    // Each line fits alone; together they need three of size 42.
    let request = order(
        user,
        vec![
            sized_line(shoe, "42", 2, baht(2_000)),
            sized_line(shoe, "42", 1, baht(2_000)),
        ],
        PaymentMethod::CashOnDelivery,
    );
    let err = OrderService::new(&store).place_order(&request).await.unwrap_err();
    assert!(matches!(err, ServiceError::OutOfStock(_)));
    assert_eq!(store.size_stock(shoe, "42").await, Some(2));
}

#[tokio::test]
async fn test_total_is_sum_of_line_subtotals() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(baht(100_000)).await;
    let shoe = store.add_product("Air Max 90", Money::from_satang(470_050), 10).await;
    let kit = store.add_product("Sneaker Cleaning Kit", baht(590), 10).await;

    let request = order(
        user,
        vec![
            line(shoe, 3, Money::from_satang(470_050)),
            line(kit, 2, baht(590)),
        ],
        PaymentMethod::StoreCredit,
    );
    let placed = OrderService::new(&store).place_order(&request).await.unwrap();

    let orders = store.orders().await;
    let subtotals: Money = orders[0].items.iter().map(|i| i.subtotal).sum();
    assert_eq!(orders[0].header.total_amount, subtotals);
    assert_eq!(placed.total_amount, Money::from_satang(1_410_150 + 118_000));
}

#[tokio::test]
async fn test_top_up_then_spend() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(Money::ZERO).await;
    let shoe = store.add_product("Chuck 70 Hi", baht(2_900), 3).await;

    let balance = WalletService::new(&store, baht(50_000))
        .top_up(user, baht(3_000))
        .await
        .unwrap();
    assert_eq!(balance, baht(3_000));

    let request = order(user, vec![line(shoe, 1, baht(2_900))], PaymentMethod::StoreCredit);
    let placed = OrderService::new(&store).place_order(&request).await.unwrap();
    assert_eq!(placed.new_balance, Some(baht(100)));

    // One wallet notification, one order notification.
    assert_eq!(store.notifications(user).await.len(), 2);
}
