//! Inbox notification types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kicks_core::{Money, NotificationId, NotificationKind, OrderStatus, UserId};

/// A notification to append to a user's inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl NewNotification {
    /// Sent once an order has been committed.
    #[must_use]
    pub fn order_placed(user_id: UserId, order_number: &str) -> Self {
        Self {
            user_id,
            kind: NotificationKind::Order,
            title: "Order placed".to_owned(),
            message: format!("Your order {order_number} has been placed successfully."),
        }
    }

    /// Sent on every status update, including repeats of the same status.
    #[must_use]
    pub fn order_status_changed(user_id: UserId, order_number: &str, status: OrderStatus) -> Self {
        let (title, message) = match status {
            OrderStatus::Delivered => (
                "Order delivered",
                format!("Your order {order_number} has been delivered. Enjoy your new kicks!"),
            ),
            other => (
                "Order update",
                format!("Your order {order_number} is now {}.", other.label()),
            ),
        };

        Self {
            user_id,
            kind: NotificationKind::Order,
            title: title.to_owned(),
            message,
        }
    }

    /// Sent after a successful wallet top-up.
    #[must_use]
    pub fn wallet_topped_up(user_id: UserId, amount: Money) -> Self {
        Self {
            user_id,
            kind: NotificationKind::Wallet,
            title: "Wallet topped up".to_owned(),
            message: format!("{amount} was added to your store credit."),
        }
    }
}

/// A persisted notification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_placed_message() {
        let n = NewNotification::order_placed(UserId::new(1), "ORD-1");
        assert_eq!(n.title, "Order placed");
        assert_eq!(n.message, "Your order ORD-1 has been placed successfully.");
        assert_eq!(n.kind, NotificationKind::Order);
    }

    #[test]
    fn test_status_update_uses_label() {
        let n = NewNotification::order_status_changed(UserId::new(1), "ORD-1", OrderStatus::Shipped);
        assert_eq!(n.title, "Order update");
        assert_eq!(n.message, "Your order ORD-1 is now Shipped.");
    }

    #[test]
    fn test_delivered_has_its_own_template() {
        let n =
            NewNotification::order_status_changed(UserId::new(1), "ORD-1", OrderStatus::Delivered);
        assert_eq!(n.title, "Order delivered");
        assert!(n.message.contains("has been delivered"));
    }

    #[test]
    fn test_wallet_top_up_formats_baht() {
        let n = NewNotification::wallet_topped_up(UserId::new(1), Money::from_satang(150_000));
        assert_eq!(n.kind, NotificationKind::Wallet);
        assert_eq!(n.message, "฿1,500.00 was added to your store credit.");
    }
}
