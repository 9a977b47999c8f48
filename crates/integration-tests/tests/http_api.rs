//! The router end to end: envelopes, status codes and middleware.
//!
//! Only endpoints backed by the checkout store are driven here; catalog and
//! account endpoints need `PostgreSQL`.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use kicks_core::{Money, OrderStatus};
use kicks_integration_tests::{baht, test_app};
use kicks_storefront::store::MemoryCheckoutStore;

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "198.51.100.7");
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn money(value: &Value) -> Money {
    serde_json::from_value(value.clone()).unwrap()
}

#[tokio::test]
async fn test_place_order_over_http() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(baht(1_000)).await;
    let shoe = store
        .add_sized_product("Air Max 90", baht(600), &[("42", 5)])
        .await;
    let app = test_app(&store);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "userId": user,
            "items": [{
                "productId": shoe,
                "quantity": 1,
                "unitPrice": 600,
                "selectedSize": "42",
            }],
            "totalAmount": "600.00",
            "paymentMethod": "store_credit",
            "address": "99 Sukhumvit Rd, Bangkok",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "processing");
    assert_eq!(money(&body["newBalance"]), baht(400));
    assert!(body["orderNumber"].as_str().unwrap().starts_with("ORD-"));
    assert_eq!(store.size_stock(shoe, "42").await, Some(4));
}

#[tokio::test]
async fn test_checkout_failures_map_to_status_codes() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(baht(100)).await;
    let shoe = store.add_product("990v6", baht(600), 1).await;
    let app = test_app(&store);

    let place = |quantity: u32, method: &str| {
        json!({
            "userId": user,
            "items": [{ "productId": shoe, "quantity": quantity, "unitPrice": 600 }],
            "paymentMethod": method,
            "shippingAddress": "Chiang Mai",
        })
    };

    let (status, body) = send(&app, Method::POST, "/api/orders", Some(place(2, "cod"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("990v6"));

    let (status, _) = send(&app, Method::POST, "/api/orders", Some(place(1, "store_credit"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::POST, "/api/orders", Some(place(0, "cod"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/api/orders", Some(place(1, "bitcoin"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(store.stock(shoe).await, Some(1));
    assert!(store.orders().await.is_empty());
}

#[tokio::test]
async fn test_update_order_status_over_http() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(Money::ZERO).await;
    let shoe = store.add_product("Chuck 70 Hi", baht(2_900), 3).await;
    let app = test_app(&store);

    let (_, placed) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "userId": user,
            "items": [{ "productId": shoe, "quantity": 1, "unitPrice": "2900.00" }],
            "paymentMethod": "promptpay",
            "shippingAddress": "Phuket",
        })),
    )
    .await;
    assert_eq!(placed["status"], "pending");
    let order_id = placed["orderId"].as_i64().unwrap();

    let uri = format!("/api/orders/{order_id}");
    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "status": "shipped" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "shipped");
    assert_eq!(body["orderNumber"], placed["orderNumber"]);

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "status": "teleported" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/orders/4040",
        Some(json!({ "status": "shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/orders/ORD-20260101000000000-ABCD",
        Some(json!({ "status": "shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let order = store.orders().await.remove(0);
    assert_eq!(store.order_status(order.id).await, Some(OrderStatus::Shipped));
}

#[tokio::test]
async fn test_wallet_over_http() {
    let store = MemoryCheckoutStore::new();
    let user = store.add_user(Money::ZERO).await;
    let app = test_app(&store);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/wallet/topup",
        Some(json!({ "userId": user, "amount": 500 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&body["newBalance"]), baht(500));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/wallet/deduct",
        Some(json!({ "userId": user, "amount": "120.50" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&body["newBalance"]), Money::from_satang(37_950));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/wallet/deduct",
        Some(json!({ "userId": user, "amount": 1_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Above the configured ceiling of ฿10,000.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/wallet/topup",
        Some(json!({ "userId": user, "amount": 10_001 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/wallet/topup",
        Some(json!({ "userId": 999, "amount": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(store.balance(user).await, Some(Money::from_satang(37_950)));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app(&MemoryCheckoutStore::new());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Request body is not valid JSON");
}

#[tokio::test]
async fn test_invalid_fields_do_not_leak_decoder_detail() {
    let app = test_app(&MemoryCheckoutStore::new());
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/wallet/topup",
        Some(json!({ "userId": "seven", "amount": 10 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Request body has missing or invalid fields");
}

#[tokio::test]
async fn test_health_and_response_headers() {
    let app = test_app(&MemoryCheckoutStore::new());

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-request-id"], "req-abc-123");
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");

    // A request ID is generated when the client sends none.
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = test_app(&MemoryCheckoutStore::new());
    let (status, _) = send(&app, Method::GET, "/api/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_auth_routes_are_rate_limited() {
    let app = test_app(&MemoryCheckoutStore::new());

    // Malformed bodies are rejected before any database access.
    for _ in 0..5 {
        let (status, _) = send(&app, Method::POST, "/api/auth/login", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = send(&app, Method::POST, "/api/auth/login", Some(json!({}))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Other routes do not share the auth budget.
    let (status, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}
