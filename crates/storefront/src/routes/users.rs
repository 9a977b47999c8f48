//! Profile handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use kicks_core::{Email, UserId};

use super::auth::UserResponse;
use super::{ApiJson, ApiPath, Success, success};
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::models::ProfileUpdate;
use crate::state::AppState;

/// Get a profile, including the store-credit balance.
///
/// GET /api/users/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<Success<UserResponse>>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_owned()))?;
    Ok(success(UserResponse { user }))
}

/// Update profile fields. Omitted fields are left as they are.
///
/// PUT /api/users/{id}
#[instrument(skip(state, update))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(mut update): ApiJson<ProfileUpdate>,
) -> Result<Json<Success<UserResponse>>> {
    if let Some(email) = update.email.as_deref() {
        let email = Email::parse(email).map_err(|e| AppError::BadRequest(e.to_string()))?;
        update.email = Some(email.into());
    }
    if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(AppError::BadRequest("name cannot be blank".to_owned()));
    }

    let user = UserRepository::new(state.pool())
        .update_profile(id, &update)
        .await?;
    Ok(success(UserResponse { user }))
}
