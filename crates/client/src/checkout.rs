//! Checkout: order summary and order submission.

use std::sync::Arc;

use pawshop_core::{
    CartLine, CheckoutForm, Money, OrderReceipt, Redirect, Route, Shipping, ShippingPolicy,
    ValidationErrors,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::api::ShopBackend;
use crate::cart::CartSync;
use crate::error::{ClientError, Result, add_breadcrumb};
use crate::notice::Notices;
use crate::views::CartSummary;

/// Everything the checkout page shows next to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub lines: Vec<CartLine>,
    pub subtotal: Option<Money>,
    pub shipping: Shipping,
    pub total: Option<Money>,
}

/// A placed order and where to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub receipt: OrderReceipt,
    pub next: Redirect,
}

/// Checkout page service.
pub struct Checkout<B> {
    backend: Arc<B>,
    cart: CartSync<B>,
    notices: Notices,
    shipping: ShippingPolicy,
}

impl<B: ShopBackend> Checkout<B> {
    #[must_use]
    pub const fn new(
        backend: Arc<B>,
        cart: CartSync<B>,
        notices: Notices,
        shipping: ShippingPolicy,
    ) -> Self {
        Self {
            backend,
            cart,
            notices,
            shipping,
        }
    }

    /// Load the cart and summarize it.
    ///
    /// A failed load posts "Failed to load cart" and yields an empty summary
    /// with unknown shipping.
    pub async fn summary(&self) -> CheckoutSummary {
        let cart = self
            .cart
            .load()
            .await
            .inspect_err(|e| {
                e.report();
                self.notices.error("Failed to load cart");
            })
            .ok();
        let totals = CartSummary::new(cart.as_ref(), &self.shipping);
        CheckoutSummary {
            lines: cart.map(|c| c.lines).unwrap_or_default(),
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            total: totals.total,
        }
    }

    /// Validate `form` and place the order.
    ///
    /// Nothing is sent when the form is invalid or the cart is empty.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a rejected form or an empty
    /// cart, or the request error after posting an error notice.
    #[instrument(skip(self, form))]
    pub async fn submit(&self, form: CheckoutForm) -> Result<PlacedOrder> {
        let payload = form.into_payload()?;

        let cart = match self.cart.snapshot() {
            Some(cart) => cart,
            None => self.cart.load().await.inspect_err(|e| {
                e.report();
                self.notices.error("Failed to load cart");
            })?,
        };
        if cart.is_empty() {
            self.notices.warning("Your cart is empty");
            let mut errors = ValidationErrors::new();
            errors.push("cart", "Your cart is empty");
            return Err(ClientError::Validation(errors));
        }

        add_breadcrumb("checkout", "Submit order", None);
        match self.backend.checkout(&payload).await {
            Ok(receipt) => {
                info!(order_id = %receipt.order_id, total = %receipt.total, "Order placed");
                self.notices.success("Order placed");
                self.cart.refresh_count().await;
                Ok(PlacedOrder {
                    receipt,
                    next: Redirect::push(Route::Cart),
                })
            }
            Err(e) => {
                let err = ClientError::from(e);
                err.report();
                self.notices.error(err.user_message("Checkout failed"));
                Err(err)
            }
        }
    }
}
