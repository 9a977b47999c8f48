//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                           - Liveness
//! GET  /health/ready                     - Readiness (database ping)
//!
//! # Auth (rate limited)
//! POST /api/auth/register                - Create an account
//! POST /api/auth/login                   - Check credentials, return profile
//!
//! # Users
//! GET  /api/users/{id}                   - Profile
//! PUT  /api/users/{id}                   - Update profile fields
//!
//! # Catalog
//! GET  /api/products                     - Active products (?category&brand&search&new)
//! GET  /api/products/brands              - Distinct brands
//! GET  /api/products/{id}                - Detail with sizes and images
//!
//! # Orders
//! POST /api/orders                       - Place an order
//! GET  /api/orders                       - Summaries (?userId&status&filter)
//! GET  /api/orders/{id}                  - Detail by id or order number
//! PUT  /api/orders/{id}                  - Change status
//!
//! # Wallet
//! POST /api/wallet/topup                 - Add store credit
//! POST /api/wallet/deduct                - Debit store credit
//!
//! # Inbox
//! GET  /api/notifications                - List (?userId&unreadOnly)
//! PUT  /api/notifications/read-all       - Mark all read
//! PUT  /api/notifications/{id}/read      - Mark one read
//!
//! # Favorites
//! GET    /api/favorites                  - Saved products (?userId)
//! POST   /api/favorites                  - Save a product
//! DELETE /api/favorites/{userId}/{productId}
//!
//! # Contact
//! POST /api/contact                      - Store a contact message
//! ```
//!
//! Successful responses carry `"success": true` next to their payload;
//! failures are rendered by [`AppError`].

pub mod auth;
pub mod contact;
pub mod favorites;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod users;
pub mod wallet;

use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts},
    middleware as axum_middleware,
    routing::{get, post, put},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::{
    auth_rate_limiter, request_id_middleware, request_span, security_headers_middleware,
};
use crate::state::AppState;

// =============================================================================
// Extractors and envelope
// =============================================================================

/// JSON body extractor whose rejections render as [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections render as [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path extractor whose rejections render as [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Successful response: `{"success": true, ...body}`.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

/// Wrap a payload in the success envelope.
pub const fn success<T: Serialize>(body: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        body,
    })
}

/// Body for endpoints with nothing to report beyond success.
#[derive(Debug, Serialize)]
pub struct Empty {}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/{id}", get(users::show).put(users::update))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/brands", get(products::brands))
        .route("/{id}", get(products::show))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show).put(orders::update_status))
}

/// Create the wallet routes router.
pub fn wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/topup", post(wallet::top_up))
        .route("/deduct", post(wallet::deduct))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::index))
        .route("/read-all", put(notifications::mark_all_read))
        .route("/{id}/read", put(notifications::mark_read))
}

/// Create the favorite routes router.
pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index).post(favorites::add))
        .route(
            "/{user_id}/{product_id}",
            axum::routing::delete(favorites::remove),
        )
}

/// Create all `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/wallet", wallet_routes())
        .nest("/notifications", notification_routes())
        .nest("/favorites", favorite_routes())
        .route("/contact", post(contact::submit))
}

/// Build the complete application router with its middleware stack.
///
/// Sentry layers are added by the binary; everything else lives here so
/// tests exercise the same stack.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}
