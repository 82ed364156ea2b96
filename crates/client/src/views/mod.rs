//! Page controllers that sit between services and whatever renders them.

pub mod cart;

pub use cart::{CartPage, CartSummary, QuantityChange};
