//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kicks_core::{Email, Money, UserId, UserRole, Username};

/// A storefront account (domain type).
///
/// Serializes as the public profile: the password hash never leaves the
/// repository layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// Display name.
    pub name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    /// Default shipping address offered at checkout.
    pub address: Option<String>,
    pub role: UserRole,
    /// Store-credit wallet balance. Never negative.
    pub credit_balance: Money,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Editable profile fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// A validated registration, ready to insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub password_hash: String,
    pub name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
