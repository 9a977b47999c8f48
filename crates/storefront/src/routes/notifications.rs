//! Inbox handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kicks_core::{NotificationId, UserId};

use super::{ApiJson, ApiPath, ApiQuery, Empty, Success, success};
use crate::db::NotificationRepository;
use crate::error::Result;
use crate::models::Notification;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxQuery {
    pub user_id: UserId,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadAllRequest {
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxResponse {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedResponse {
    pub updated: u64,
}

/// A user's notifications, newest first, with the unread count.
///
/// GET /api/notifications?userId=&unreadOnly=
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<InboxQuery>,
) -> Result<Json<Success<InboxResponse>>> {
    let repo = NotificationRepository::new(state.pool());
    let notifications = repo.list(query.user_id, query.unread_only).await?;
    let unread_count = repo.unread_count(query.user_id).await?;
    Ok(success(InboxResponse {
        notifications,
        unread_count,
    }))
}

/// Mark one notification read.
///
/// PUT /api/notifications/{id}/read
#[instrument(skip(state))]
pub async fn mark_read(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<NotificationId>,
) -> Result<Json<Success<Empty>>> {
    NotificationRepository::new(state.pool()).mark_read(id).await?;
    Ok(success(Empty {}))
}

/// Mark every notification of a user read.
///
/// PUT /api/notifications/read-all
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ReadAllRequest>,
) -> Result<Json<Success<MarkedResponse>>> {
    let updated = NotificationRepository::new(state.pool())
        .mark_all_read(request.user_id)
        .await?;
    Ok(success(MarkedResponse { updated }))
}
