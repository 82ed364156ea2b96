//! Pawshop client library.
//!
//! Storefront and admin client for the Pawshop backend: the session guard
//! for admin and login routes, the shared cart synchronizer, catalog,
//! checkout and the admin product manager. Everything is wired together
//! by [`state::AppState`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod credential;
pub mod error;
pub mod guard;
pub mod notice;
pub mod router;
pub mod state;
pub mod views;

#[cfg(test)]
mod testing;
