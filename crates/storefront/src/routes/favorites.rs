//! Favorite product handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kicks_core::{ProductId, UserId};

use super::{ApiJson, ApiPath, ApiQuery, Empty, Success, success};
use crate::db::FavoriteRepository;
use crate::error::Result;
use crate::models::Product;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesQuery {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: bool,
}

/// GET /api/favorites?userId=
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FavoritesQuery>,
) -> Result<Json<Success<FavoritesResponse>>> {
    let favorites = FavoriteRepository::new(state.pool())
        .products(query.user_id)
        .await?;
    Ok(success(FavoritesResponse { favorites }))
}

/// Save a product. Saving twice is fine.
///
/// POST /api/favorites
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FavoriteRequest>,
) -> Result<Json<Success<Empty>>> {
    FavoriteRepository::new(state.pool())
        .add(request.user_id, request.product_id)
        .await?;
    Ok(success(Empty {}))
}

/// DELETE /api/favorites/{userId}/{productId}
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    ApiPath((user_id, product_id)): ApiPath<(UserId, ProductId)>,
) -> Result<Json<Success<RemovedResponse>>> {
    let removed = FavoriteRepository::new(state.pool())
        .remove(user_id, product_id)
        .await?;
    Ok(success(RemovedResponse { removed }))
}
