//! Backend REST API contract and its HTTP implementation.
//!
//! # Architecture
//!
//! - [`ShopBackend`] is the seam every service talks through. Production code
//!   uses [`HttpBackend`]; tests substitute in-memory fakes.
//! - The backend is the source of truth for carts, products and sessions.
//!   Nothing here caches mutable state.
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | sign in | `POST /admin/signin` |
//! | validate session | `POST /api/user/check` |
//! | cart | `GET, POST /api/{path}/cart`, `PUT, DELETE /api/{path}/cart/{id}` |
//! | checkout | `POST /api/{path}/order` |
//! | catalog | `GET /api/{path}/products`, `GET /api/{path}/product/{id}` |
//! | admin products | `GET /api/{path}/admin/products`, `POST /api/{path}/admin/product`, `PUT, DELETE /api/{path}/admin/product/{id}` |

mod http;
mod wire;

use std::future::Future;

use pawshop_core::{
    Cart, CartIntent, CartItemId, Credential, Email, OrderPayload, OrderReceipt, Product,
    ProductDraft, ProductId, ProductPage,
};
use secrecy::SecretString;
use thiserror::Error;

pub use http::HttpBackend;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded the transport timeout.
    #[error("Request timed out")]
    Timeout,

    /// The credential is missing, expired or rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend refused the request (`success: false` or a non-2xx status).
    #[error("Rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Backend message, joined when it sent several.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// The message the backend attached to a refusal, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } | Self::Unauthorized(message) | Self::NotFound(message)
                if !message.is_empty() =>
            {
                Some(message)
            }
            _ => None,
        }
    }

    /// Whether the failure means the admin session is not valid.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Operations the storefront and admin panel need from the backend.
///
/// Implementations must be cheap to share: services hold them behind an
/// `Arc` and call them from concurrent tasks.
pub trait ShopBackend: Send + Sync + 'static {
    /// Check whether the stored credential is still accepted.
    fn validate_session(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Sign in and obtain a credential.
    fn login(
        &self,
        username: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<Credential, ApiError>> + Send;

    /// Fetch the current cart.
    fn get_cart(&self) -> impl Future<Output = Result<Cart, ApiError>> + Send;

    /// Add a product to the cart.
    fn add_cart_item(
        &self,
        intent: &CartIntent,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Change the quantity of a cart line.
    fn update_cart_item(
        &self,
        id: &CartItemId,
        intent: &CartIntent,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Remove a cart line.
    fn remove_cart_item(&self, id: &CartItemId)
    -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Place an order for the current cart.
    fn checkout(
        &self,
        order: &OrderPayload,
    ) -> impl Future<Output = Result<OrderReceipt, ApiError>> + Send;

    /// List enabled products, optionally filtered by category.
    fn list_products(
        &self,
        category: Option<&str>,
        page: u32,
    ) -> impl Future<Output = Result<ProductPage, ApiError>> + Send;

    /// Fetch a single product.
    fn get_product(&self, id: &ProductId)
    -> impl Future<Output = Result<Product, ApiError>> + Send;

    /// List every product, including disabled ones (admin).
    fn admin_list_products(
        &self,
        page: u32,
    ) -> impl Future<Output = Result<ProductPage, ApiError>> + Send;

    /// Create a product (admin).
    fn admin_create_product(
        &self,
        draft: &ProductDraft,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Replace a product (admin).
    fn admin_update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete a product (admin).
    fn admin_delete_product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
