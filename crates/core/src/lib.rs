//! Kicks Core - Shared types library.
//!
//! This crate provides the domain vocabulary used across the Kicks workspace:
//! - `storefront` - JSON API for catalog, checkout, wallet and order history
//! - `cli` - Command-line tools for migrations, seeding and back-office tasks
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database encodings are gated behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, money, usernames, emails, and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
