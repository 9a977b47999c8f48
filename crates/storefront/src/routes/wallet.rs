//! Store-credit wallet handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kicks_core::{Money, UserId};

use super::{ApiJson, Success, success};
use crate::error::Result;
use crate::services::WalletService;
use crate::state::AppState;

/// Body of a wallet operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRequest {
    pub user_id: UserId,
    pub amount: Money,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub new_balance: Money,
}

fn wallet(state: &AppState) -> WalletService<'_> {
    WalletService::new(state.checkout(), state.config().max_top_up)
}

/// Add store credit.
///
/// POST /api/wallet/topup
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
pub async fn top_up(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<WalletRequest>,
) -> Result<Json<Success<BalanceResponse>>> {
    let new_balance = wallet(&state)
        .top_up(request.user_id, request.amount)
        .await?;
    Ok(success(BalanceResponse { new_balance }))
}

/// Debit store credit.
///
/// POST /api/wallet/deduct
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
pub async fn deduct(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<WalletRequest>,
) -> Result<Json<Success<BalanceResponse>>> {
    let new_balance = wallet(&state)
        .debit(request.user_id, request.amount)
        .await?;
    Ok(success(BalanceResponse { new_balance }))
}
