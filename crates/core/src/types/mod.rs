//! Core types for Pawshop.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod credential;
pub mod email;
pub mod id;
pub mod money;
pub mod order;
pub mod product;
pub mod route;
pub mod status;
pub mod validation;

pub use cart::{Cart, CartIntent, CartLine, CartProduct};
pub use credential::Credential;
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Money, Shipping, ShippingPolicy};
pub use order::{CheckoutForm, OrderPayload, OrderReceipt, OrderUser};
pub use product::{Pagination, Product, ProductDraft, ProductPage};
pub use route::{NavigationState, Redirect, Route, RouteCategory};
pub use status::{ProductStatus, SessionState};
pub use validation::{FieldError, ValidationErrors};
