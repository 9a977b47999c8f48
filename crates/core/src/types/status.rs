//! Status enums for various entities.
//!
//! Each enum maps onto a Postgres enum type in the `storefront` schema when the
//! `postgres` feature is enabled, and onto a lowercase string in JSON.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Order lifecycle status.
///
/// `pending → processing → shipped → delivered`, with `cancelled` as a
/// separate terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire representation (`"pending"`, `"processing"`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human-readable label used in customer notifications.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether no further transitions are expected.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| ParseEnumError::new("order status", s))
    }
}

/// Simulated payment methods offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "storefront.payment_method"))]
pub enum PaymentMethod {
    /// Debited from the customer's store-credit wallet.
    #[serde(rename = "store_credit")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "store_credit"))]
    StoreCredit,
    /// `TrueMoney` e-wallet (simulated, treated as paid).
    #[serde(rename = "truemoney")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "truemoney"))]
    TrueMoney,
    /// `PromptPay` QR transfer (simulated, awaits confirmation).
    #[serde(rename = "promptpay")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "promptpay"))]
    PromptPay,
    /// Cash on delivery.
    #[serde(rename = "cod")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "cod"))]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StoreCredit => "store_credit",
            Self::TrueMoney => "truemoney",
            Self::PromptPay => "promptpay",
            Self::CashOnDelivery => "cod",
        }
    }

    /// Status a freshly placed order starts in.
    ///
    /// Methods that settle at checkout go straight to `processing`.
    #[must_use]
    pub const fn initial_order_status(&self) -> OrderStatus {
        match self {
            Self::StoreCredit | Self::TrueMoney => OrderStatus::Processing,
            Self::PromptPay | Self::CashOnDelivery => OrderStatus::Pending,
        }
    }

    /// Whether placing the order debits the wallet.
    #[must_use]
    pub const fn uses_store_credit(&self) -> bool {
        matches!(self, Self::StoreCredit)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "store_credit" => Ok(Self::StoreCredit),
            "truemoney" => Ok(Self::TrueMoney),
            "promptpay" => Ok(Self::PromptPay),
            "cod" => Ok(Self::CashOnDelivery),
            other => Err(ParseEnumError::new("payment method", other)),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular shopper.
    #[default]
    User,
    /// Back-office access.
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseEnumError::new("user role", s)),
        }
    }
}

/// Type tag of an inbox notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.notification_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Order,
    Wallet,
    System,
}
