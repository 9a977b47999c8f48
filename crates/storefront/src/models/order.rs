//! Order domain types.
//!
//! An order is written once by checkout: the header, a frozen snapshot of every
//! line, and nothing else. Afterwards only its status moves.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use kicks_core::{Money, OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId, UserId};

/// One line of the cart submitted at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Price the client displayed. Checked against the catalog, never trusted.
    pub unit_price: Money,
    /// Display name the client showed; the stored snapshot uses the catalog name.
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub selected_size: Option<String>,
}

impl CartItem {
    /// The selected size with surrounding whitespace removed, if any.
    #[must_use]
    pub fn size(&self) -> Option<&str> {
        self.selected_size
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A checkout request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    /// Total the client displayed, if sent. Must match the recomputed total.
    #[serde(default)]
    pub total_amount: Option<Money>,
    pub payment_method: PaymentMethod,
    #[serde(alias = "address")]
    pub shipping_address: String,
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub total_amount: Money,
    /// Wallet balance after the debit; only set for store-credit orders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_balance: Option<Money>,
}

/// Order header as written by checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: UserId,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
}

/// Frozen line item as written by checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    /// Catalog name at checkout, with a ` (Size ..)` suffix for sized lines.
    pub product_name: String,
    pub size: Option<String>,
    pub quantity: i32,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// The fields of an order needed to change its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHeader {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_number: String,
    pub status: OrderStatus,
}

/// A persisted order header.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted line item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub size: Option<String>,
    pub quantity: i32,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Order header plus its line items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Row of an order listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub username: String,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Time window for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderWindow {
    Today,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl OrderWindow {
    /// Earliest `created_at` included by this window, or `None` for no bound.
    ///
    /// `today` starts at UTC midnight; the others are rolling windows of 7, 30
    /// and 365 days.
    #[must_use]
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Today => Some(now.date_naive().and_time(NaiveTime::MIN).and_utc()),
            Self::Week => Some(now - Duration::days(7)),
            Self::Month => Some(now - Duration::days(30)),
            Self::Year => Some(now - Duration::days(365)),
            Self::All => None,
        }
    }
}

/// Filters for order listings.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub user_id: Option<UserId>,
    pub status: Option<OrderStatus>,
    pub window: OrderWindow,
}

/// How an order is addressed in a URL: numeric id or order number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRef {
    Id(OrderId),
    Number(String),
}

impl OrderRef {
    /// All-digit input is an id; anything else is an order number.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<OrderId>() {
            Ok(id) if raw.bytes().all(|b| b.is_ascii_digit()) => Self::Id(id),
            _ => Self::Number(raw.to_owned()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_window_today_starts_at_midnight() {
        let since = OrderWindow::Today.since(noon()).unwrap();
        assert_eq!(since, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_rolling_windows() {
        assert_eq!(
            OrderWindow::Week.since(noon()).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 8, 12, 30, 0).unwrap()
        );
        assert_eq!(
            OrderWindow::Month.since(noon()).unwrap(),
            noon() - Duration::days(30)
        );
        assert_eq!(
            OrderWindow::Year.since(noon()).unwrap(),
            noon() - Duration::days(365)
        );
        assert!(OrderWindow::All.since(noon()).is_none());
    }

    #[test]
    fn test_window_deserializes_lowercase() {
        let window: OrderWindow = serde_json::from_str("\"week\"").unwrap();
        assert_eq!(window, OrderWindow::Week);
    }

    #[test]
    fn test_order_ref_parse() {
        assert_eq!(OrderRef::parse("42"), OrderRef::Id(OrderId::new(42)));
        assert_eq!(
            OrderRef::parse("ORD-20260315123000000-AB12"),
            OrderRef::Number("ORD-20260315123000000-AB12".to_owned())
        );
        assert_eq!(OrderRef::parse("+42"), OrderRef::Number("+42".to_owned()));
    }

    #[test]
    fn test_cart_item_size_ignores_blank() {
        let item: CartItem = serde_json::from_value(serde_json::json!({
            "productId": 1,
            "quantity": 1,
            "unitPrice": 600,
            "selectedSize": "  "
        }))
        .unwrap();
        assert_eq!(item.size(), None);

        let item: CartItem = serde_json::from_value(serde_json::json!({
            "productId": 1,
            "quantity": 1,
            "unitPrice": "600.00",
            "selectedSize": " EU 42 "
        }))
        .unwrap();
        assert_eq!(item.size(), Some("EU 42"));
    }

    #[test]
    fn test_place_order_accepts_address_alias() {
        let order: PlaceOrder = serde_json::from_value(serde_json::json!({
            "userId": 3,
            "items": [],
            "totalAmount": 600,
            "paymentMethod": "cod",
            "address": "99 Sukhumvit Rd, Bangkok"
        }))
        .unwrap();
        assert_eq!(order.shipping_address, "99 Sukhumvit Rd, Bangkok");
        assert_eq!(order.payment_method, PaymentMethod::CashOnDelivery);
    }

    #[test]
    fn test_placed_order_omits_balance_when_absent() {
        let placed = PlacedOrder {
            order_id: OrderId::new(1),
            order_number: "ORD-1".to_owned(),
            status: OrderStatus::Pending,
            total_amount: Money::from_satang(60_000),
            new_balance: None,
        };
        let json = serde_json::to_value(&placed).unwrap();
        assert!(json.get("newBalance").is_none());
        assert_eq!(json["orderId"], 1);
    }
}
