//! A failed checkout leaves no order, no line item, no stock movement and no
//! wallet movement behind, wherever it fails.

use kicks_core::{OrderStatus, PaymentMethod};
use kicks_integration_tests::{baht, line, order, sized_line};
use kicks_storefront::services::{OrderService, ServiceError};
use kicks_storefront::store::{FailPoint, MemoryCheckoutStore};

#[tokio::test]
async fn test_out_of_stock_on_second_of_three_items_changes_nothing() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(baht(10_000)).await;
    let first = store.add_product("Air Max 90", baht(1_000), 5).await;
    let second = store.add_product("Gel-Kayano 30", baht(2_000), 1).await;
    let third = store.add_product("Chuck 70 Hi", baht(500), 5).await;

    let request = order(
        user,
        vec![
            line(first, 1, baht(1_000)),
            line(second, 2, baht(2_000)),
            line(third, 1, baht(500)),
        ],
        PaymentMethod::StoreCredit,
    );

    let err = OrderService::new(&store).place_order(&request).await.unwrap_err();
    assert!(matches!(err, ServiceError::OutOfStock(ref m) if m.contains("Gel-Kayano 30")));

    assert!(store.orders().await.is_empty());
    assert_eq!(store.stock(first).await, Some(5));
    assert_eq!(store.stock(second).await, Some(1));
    assert_eq!(store.stock(third).await, Some(5));
    assert_eq!(store.balance(user).await, Some(baht(10_000)));
    assert!(store.notifications(user).await.is_empty());
}

#[tokio::test]
async fn test_storage_failure_at_any_write_rolls_back() {
    for point in [
        FailPoint::Begin,
        FailPoint::LockUser,
        FailPoint::LockProduct,
        FailPoint::LockSize,
        FailPoint::InsertOrder,
        FailPoint::InsertOrderItem,
        FailPoint::TakeSizeStock,
        FailPoint::TakeProductStock,
        FailPoint::DebitBalance,
        FailPoint::InsertNotification,
        FailPoint::Commit,
    ] {
        let store = MemoryCheckoutStore::new();
        let user = store.add_user(baht(5_000)).await;
        let shoe = store
            .add_sized_product("Ultraboost Light", baht(1_500), &[("42", 3), ("43", 2)])
            .await;

        store.fail_at(point).await;
        let request = order(
            user,
            vec![sized_line(shoe, "42", 2, baht(1_500))],
            PaymentMethod::StoreCredit,
        );
        let err = OrderService::new(&store).place_order(&request).await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)), "{point:?}: {err}");

        assert!(store.orders().await.is_empty(), "{point:?}");
        assert_eq!(store.stock(shoe).await, Some(5), "{point:?}");
        assert_eq!(store.size_stock(shoe, "42").await, Some(3), "{point:?}");
        assert_eq!(store.balance(user).await, Some(baht(5_000)), "{point:?}");
        assert!(store.notifications(user).await.is_empty(), "{point:?}");
    }
}

#[tokio::test]
async fn test_store_recovers_after_failure_is_cleared() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(baht(1_000)).await;
    let kit = store.add_product("Sneaker Cleaning Kit", baht(590), 10).await;
    let request = order(user, vec![line(kit, 1, baht(590))], PaymentMethod::StoreCredit);

    store.fail_at(FailPoint::DebitBalance).await;
    assert!(OrderService::new(&store).place_order(&request).await.is_err());

    store.clear_failure().await;
    let placed = OrderService::new(&store).place_order(&request).await.unwrap();
    assert_eq!(placed.new_balance, Some(baht(410)));
    assert_eq!(store.stock(kit).await, Some(9));
    assert_eq!(store.orders().await.len(), 1);
}

#[tokio::test]
async fn test_validation_failures_write_nothing() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(baht(1_000)).await;
    let shoe = store.add_product("990v6", baht(800), 3).await;
    let service = OrderService::new(&store);

    // Client price disagrees with the catalog.
    let stale = order(user, vec![line(shoe, 1, baht(700))], PaymentMethod::CashOnDelivery);
    assert!(matches!(
        service.place_order(&stale).await,
        Err(ServiceError::InvalidArgument(_))
    ));

    // Client total disagrees with the recomputed total.
    let mut wrong_total = order(user, vec![line(shoe, 1, baht(800))], PaymentMethod::CashOnDelivery);
    wrong_total.total_amount = Some(baht(1));
    assert!(matches!(
        service.place_order(&wrong_total).await,
        Err(ServiceError::InvalidArgument(_))
    ));

    // Hidden product.
    store.set_active(shoe, false).await;
    let hidden = order(user, vec![line(shoe, 1, baht(800))], PaymentMethod::CashOnDelivery);
    assert!(matches!(
        service.place_order(&hidden).await,
        Err(ServiceError::NotFound(_))
    ));

    assert!(store.orders().await.is_empty());
    assert_eq!(store.stock(shoe).await, Some(3));
}

#[tokio::test]
async fn test_status_update_failure_keeps_status_and_inbox() {
    for point in [
        FailPoint::LockOrder,
        FailPoint::SetOrderStatus,
        FailPoint::InsertNotification,
        FailPoint::Commit,
    ] {
        let store = MemoryCheckoutStore::new();
        let user = store.add_user(baht(0)).await;
        let shoe = store.add_product("Air Force 1", baht(3_500), 2).await;
        let service = OrderService::new(&store);
        let placed = service
            .place_order(&order(user, vec![line(shoe, 1, baht(3_500))], PaymentMethod::PromptPay))
            .await
            .unwrap();

        store.fail_at(point).await;
        let err = service
            .update_order_status(placed.order_id, "shipped")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)), "{point:?}: {err}");

        assert_eq!(
            store.order_status(placed.order_id).await,
            Some(OrderStatus::Pending),
            "{point:?}"
        );
        assert_eq!(store.notifications(user).await.len(), 1, "{point:?}");
    }
}
