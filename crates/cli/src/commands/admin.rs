//! Back-office role management.

use kicks_core::{UserRole, Username};
use kicks_storefront::db::{RepositoryError, UserRepository};

use super::{CommandError, connect};

/// Give a user the admin role.
///
/// # Errors
///
/// Returns `CommandError::UnknownUser` if no account has this username.
pub async fn promote(username: &str) -> Result<(), CommandError> {
    set_role(username, UserRole::Admin).await
}

/// Return a user to the regular role.
///
/// # Errors
///
/// Returns `CommandError::UnknownUser` if no account has this username.
pub async fn demote(username: &str) -> Result<(), CommandError> {
    set_role(username, UserRole::User).await
}

async fn set_role(username: &str, role: UserRole) -> Result<(), CommandError> {
    let parsed =
        Username::parse(username).map_err(|_| CommandError::UnknownUser(username.to_owned()))?;

    let (_, pool) = connect().await?;
    match UserRepository::new(&pool).set_role(&parsed, role).await {
        Ok(()) => {
            tracing::info!("{} is now {}", parsed, role);
            Ok(())
        }
        Err(RepositoryError::NotFound) => Err(CommandError::UnknownUser(username.to_owned())),
        Err(e) => Err(e.into()),
    }
}
