//! Racing checkouts never oversell stock or overdraw a wallet.

use kicks_core::{Money, PaymentMethod};
use kicks_integration_tests::{baht, line, order, sized_line};
use kicks_storefront::models::PlaceOrder;
use kicks_storefront::services::{OrderService, ServiceError};
use kicks_storefront::store::MemoryCheckoutStore;
use tokio::task::JoinSet;

/// Outcome counts of a race.
#[derive(Debug, Default)]
struct Tally {
    placed: usize,
    out_of_stock: usize,
    insufficient_funds: usize,
}

async fn race(store: &MemoryCheckoutStore, requests: Vec<PlaceOrder>) -> Tally {
    let mut tasks = JoinSet::new();
    for request in requests {
        let store = store.clone();
        tasks.spawn(async move { OrderService::new(&store).place_order(&request).await });
    }

    let mut tally = Tally::default();
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => tally.placed += 1,
            Err(ServiceError::OutOfStock(_)) => tally.out_of_stock += 1,
            Err(ServiceError::InsufficientFunds(_)) => tally.insufficient_funds += 1,
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }
    tally
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_oversell_on_shared_product() {
    let store = MemoryCheckoutStore::new();
    let shoe = store.add_product("Air Max 90", baht(1_000), 7).await;

    let mut requests = Vec::new();
    for _ in 0..10 {
        let user = store.add_user(Money::ZERO).await;
        requests.push(order(
            user,
            vec![line(shoe, 2, baht(1_000))],
            PaymentMethod::CashOnDelivery,
        ));
    }

    let tally = race(&store, requests).await;

    // 7 pairs in stock, 2 per order: 3 orders fit.
    assert_eq!(tally.placed, 3);
    assert_eq!(tally.out_of_stock, 7);
    assert_eq!(store.stock(shoe).await, Some(1));
    assert_eq!(store.orders().await.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_oversell_on_shared_size() {
    let store = MemoryCheckoutStore::new();
    let shoe = store
        .add_sized_product("Gel-Kayano 30", baht(1_200), &[("42", 3), ("43", 20)])
        .await;

    let mut requests = Vec::new();
    for _ in 0..8 {
        let user = store.add_user(Money::ZERO).await;
        requests.push(order(
            user,
            vec![sized_line(shoe, "42", 1, baht(1_200))],
            PaymentMethod::PromptPay,
        ));
    }

    let tally = race(&store, requests).await;

    assert_eq!(tally.placed, 3);
    assert_eq!(tally.out_of_stock, 5);
    assert_eq!(store.size_stock(shoe, "42").await, Some(0));
    assert_eq!(store.size_stock(shoe, "43").await, Some(20));
    assert_eq!(store.stock(shoe).await, Some(20));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_overdraft_on_shared_wallet() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(baht(1_000)).await;
    let shoe = store.add_product("Chuck 70 Hi", baht(300), 100).await;

    let requests = (0..6)
        .map(|_| {
            order(
                user,
                vec![line(shoe, 1, baht(300))],
                PaymentMethod::StoreCredit,
            )
        })
        .collect();

    let tally = race(&store, requests).await;

    // ฿1000 covers three ฿300 orders.
    assert_eq!(tally.placed, 3);
    assert_eq!(tally.insufficient_funds, 3);
    assert_eq!(store.balance(user).await, Some(baht(100)));
    assert_eq!(store.stock(shoe).await, Some(97));

    let debited: Money = store
        .orders()
        .await
        .iter()
        .map(|o| o.header.total_amount)
        .sum();
    assert_eq!(debited, baht(900));
}
