//! Checkout and order history handlers.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kicks_core::{OrderStatus, UserId};

use super::{ApiJson, ApiPath, ApiQuery, Success, success};
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::models::{
    OrderDetail, OrderFilter, OrderRef, OrderSummary, OrderWindow, PlaceOrder, PlacedOrder,
};
use crate::services::OrderService;
use crate::state::AppState;

/// Query string for order listings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub user_id: Option<UserId>,
    pub status: Option<String>,
    /// Time window: `today`, `week`, `month`, `year` or `all`.
    pub filter: Option<OrderWindow>,
}

impl OrderQuery {
    fn into_filter(self) -> Result<OrderFilter> {
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "all")
            .map(str::parse::<OrderStatus>)
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(OrderFilter {
            user_id: self.user_id,
            status,
            window: self.filter.unwrap_or_default(),
        })
    }
}

/// Body of a status change.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<OrderSummary>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: OrderDetail,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub order_number: String,
    pub status: OrderStatus,
}

/// Place an order.
///
/// POST /api/orders
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PlaceOrder>,
) -> Result<(StatusCode, Json<Success<PlacedOrder>>)> {
    let placed = OrderService::new(state.checkout())
        .place_order(&request)
        .await?;
    Ok((StatusCode::CREATED, success(placed)))
}

/// List order summaries, newest first.
///
/// GET /api/orders?userId=&status=&filter=
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> Result<Json<Success<OrdersResponse>>> {
    let filter = query.into_filter()?;
    let orders = OrderRepository::new(state.pool())
        .list(&filter, Utc::now())
        .await?;
    Ok(success(OrdersResponse { orders }))
}

/// Order header and line items, by numeric id or order number.
///
/// GET /api/orders/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Success<OrderResponse>>> {
    let order = OrderRepository::new(state.pool())
        .get_detail(&OrderRef::parse(&id))
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_owned()))?;
    Ok(success(OrderResponse { order }))
}

/// Change an order's status and notify its owner.
///
/// PUT /api/orders/{id}
#[instrument(skip(state, body), fields(status = %body.status))]
pub async fn update_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<StatusUpdate>,
) -> Result<Json<Success<StatusResponse>>> {
    let OrderRef::Id(order_id) = OrderRef::parse(&id) else {
        return Err(AppError::BadRequest("order id must be numeric".to_owned()));
    };

    let order = OrderService::new(state.checkout())
        .update_order_status(order_id, &body.status)
        .await?;
    Ok(success(StatusResponse {
        order_number: order.order_number,
        status: order.status,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_status_all_means_no_filter() {
        let query = OrderQuery {
            status: Some("all".to_owned()),
            ..OrderQuery::default()
        };
        assert!(query.into_filter().unwrap().status.is_none());
    }

    #[test]
    fn test_query_parses_status_and_window() {
        let query = OrderQuery {
            user_id: Some(UserId::new(7)),
            status: Some("shipped".to_owned()),
            filter: Some(OrderWindow::Week),
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.status, Some(OrderStatus::Shipped));
        assert_eq!(filter.window, OrderWindow::Week);
        assert_eq!(filter.user_id, Some(UserId::new(7)));
    }

    #[test]
    fn test_query_rejects_unknown_status() {
        let query = OrderQuery {
            status: Some("lost".to_owned()),
            ..OrderQuery::default()
        };
        assert!(matches!(query.into_filter(), Err(AppError::BadRequest(_))));
    }
}
