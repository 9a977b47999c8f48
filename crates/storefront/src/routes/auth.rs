//! Registration and login handlers.

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{ApiJson, Success, success};
use crate::error::{Result, set_sentry_user};
use crate::models::User;
use crate::services::{AuthService, Registration};
use crate::state::AppState;

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response carrying a user profile.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Create an account.
///
/// POST /api/auth/register
#[instrument(skip(state, registration), fields(username = %registration.username))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(registration): ApiJson<Registration>,
) -> Result<(StatusCode, axum::Json<Success<UserResponse>>)> {
    let user = AuthService::new(state.pool()).register(&registration).await?;
    info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, success(UserResponse { user })))
}

/// Check credentials and return the profile.
///
/// POST /api/auth/login
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<LoginRequest>,
) -> Result<axum::Json<Success<UserResponse>>> {
    let user = AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await?;
    set_sentry_user(&user.id, user.username.as_str());
    Ok(success(UserResponse { user }))
}
