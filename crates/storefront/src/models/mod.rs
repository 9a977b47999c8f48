//! Domain models for the storefront.
//!
//! These types are validated domain objects, separate from the database row
//! types in [`crate::db`]. Types that cross the HTTP boundary serialize in
//! `camelCase`.

pub mod contact;
pub mod notification;
pub mod order;
pub mod product;
pub mod user;

pub use contact::{ContactMessage, NewContactMessage};
pub use notification::{NewNotification, Notification};
pub use order::{
    CartItem, NewOrder, NewOrderItem, Order, OrderDetail, OrderFilter, OrderHeader, OrderItem,
    OrderRef, OrderSummary, OrderWindow, PlaceOrder, PlacedOrder,
};
pub use product::{
    NewProduct, Product, ProductDetail, ProductFilter, ProductSize, StockedProduct,
};
pub use user::{NewUser, ProfileUpdate, User};
