//! Kicks Storefront library.
//!
//! The sneaker store's JSON API as a library, so the binary, the CLI and the
//! integration tests share one implementation.
//!
//! # Modules
//!
//! - [`store`] - Transactional checkout store (`PostgreSQL` and in-memory)
//! - [`services`] - Order placement, order status, wallet and auth
//! - [`db`] - Read-side repositories
//! - [`routes`] - axum handlers and the application router
//! - [`config`], [`error`], [`middleware`], [`state`] - Ambient plumbing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
