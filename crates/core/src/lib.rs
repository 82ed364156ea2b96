//! Pawshop Core - Shared domain types.
//!
//! This crate provides the types used by every Pawshop component:
//! - `client` - Storefront and admin client library (session guard, cart sync)
//! - `cli` - Command-line front end over the client library
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation logic - no I/O,
//! no HTTP clients, no async. This keeps it lightweight and easy to test.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, emails, credentials, products, carts,
//!   orders, and routes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
