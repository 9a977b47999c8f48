//! Business logic services for the storefront.
//!
//! # Services
//!
//! - [`checkout`] - Order placement and status updates, over the checkout store
//! - [`wallet`] - Store-credit top-up and debit
//! - [`auth`] - Username and password registration and login

pub mod auth;
pub mod checkout;
mod error;
pub mod wallet;

pub use auth::{AuthError, AuthService, Registration};
pub use checkout::OrderService;
pub use error::ServiceError;
pub use wallet::WalletService;
