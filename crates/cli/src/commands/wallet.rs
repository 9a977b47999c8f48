//! Store-credit commands.

use rust_decimal::Decimal;

use kicks_core::{Money, UserId};
use kicks_storefront::services::WalletService;
use kicks_storefront::store::PgCheckoutStore;

use super::{CommandError, connect};

/// Add store credit through the same service the API uses, so the top-up
/// ceiling and the wallet notification apply.
///
/// # Errors
///
/// Returns an error if the amount is rejected, the user does not exist or the
/// database fails.
pub async fn top_up(user_id: i32, amount: Decimal) -> Result<(), CommandError> {
    let (config, pool) = connect().await?;
    let store = PgCheckoutStore::new(pool, config.lock_timeout);

    let user_id = UserId::new(user_id);
    let balance = WalletService::new(&store, config.max_top_up)
        .top_up(user_id, Money::new(amount))
        .await?;

    tracing::info!("Topped up user {user_id}; new balance {balance}");
    Ok(())
}
