//! Cart page: quantity changes, removal confirmation, and the summary box.

use pawshop_core::{Cart, CartLine, Money, Shipping, ShippingPolicy};
use serde::Serialize;

use crate::api::ShopBackend;
use crate::cart::CartSync;
use crate::error::Result;
use crate::notice::Notices;

/// Totals shown beside the cart listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Server-reported `total` before discounts, `None` until the cart has loaded.
    pub subtotal: Option<Money>,
    /// Shipping line, quoted on the subtotal.
    pub shipping: Shipping,
    /// Server-reported `final_total`, `None` until the cart has loaded.
    pub total: Option<Money>,
    /// Whether the loaded cart has no lines.
    pub is_empty: bool,
}

impl CartSummary {
    /// Summarize `cart` (or the absence of one) under `policy`.
    ///
    /// Amounts mirror the server's aggregates; only the shipping line is
    /// derived here.
    #[must_use]
    pub fn new(cart: Option<&Cart>, policy: &ShippingPolicy) -> Self {
        let subtotal = cart.map(|c| c.total);
        Self {
            subtotal,
            shipping: policy.quote(subtotal),
            total: cart.map(|c| c.final_total),
            is_empty: cart.is_none_or(Cart::is_empty),
        }
    }

    /// The checkout button is only enabled for a loaded, non-empty cart.
    #[must_use]
    pub const fn can_checkout(&self) -> bool {
        self.subtotal.is_some() && !self.is_empty
    }
}

/// Result of a quantity change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The server accepted the new quantity.
    Updated,
    /// Quantity zero: the removal confirmation is now open.
    ConfirmRemoval,
}

/// Cart page controller.
pub struct CartPage<B> {
    cart: CartSync<B>,
    notices: Notices,
    shipping: ShippingPolicy,
    pending_removal: Option<CartLine>,
}

impl<B: ShopBackend> CartPage<B> {
    #[must_use]
    pub const fn new(cart: CartSync<B>, notices: Notices, shipping: ShippingPolicy) -> Self {
        Self {
            cart,
            notices,
            shipping,
            pending_removal: None,
        }
    }

    /// Load the cart for display.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after posting a "Failed to load cart" notice.
    pub async fn load(&self) -> Result<Cart> {
        self.cart.load().await.inspect_err(|e| {
            e.report();
            self.notices.error("Failed to load cart");
        })
    }

    /// Summary of the currently published cart.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::new(self.cart.snapshot().as_ref(), &self.shipping)
    }

    /// Set `line` to `qty` units.
    ///
    /// Zero is never sent to the server; it opens the removal confirmation
    /// for `line` instead.
    ///
    /// # Errors
    ///
    /// Returns the update error after posting an error notice.
    pub async fn change_quantity(&mut self, line: &CartLine, qty: u32) -> Result<QuantityChange> {
        if qty == 0 {
            self.request_removal(line);
            return Ok(QuantityChange::ConfirmRemoval);
        }

        match self.cart.update(&line.id, &line.with_qty(qty)).await {
            Ok(()) => {
                self.notices.success("Quantity updated");
                Ok(QuantityChange::Updated)
            }
            Err(e) => {
                e.report();
                self.notices.error("Failed to update quantity");
                Err(e)
            }
        }
    }

    /// Ask for confirmation before removing `line`.
    pub fn request_removal(&mut self, line: &CartLine) {
        self.pending_removal = Some(line.clone());
    }

    /// The line awaiting removal confirmation, if any.
    #[must_use]
    pub const fn pending_removal(&self) -> Option<&CartLine> {
        self.pending_removal.as_ref()
    }

    /// Close the confirmation without removing anything.
    pub fn cancel_removal(&mut self) {
        self.pending_removal = None;
    }

    /// Remove the line awaiting confirmation.
    ///
    /// Returns `Ok(false)` when nothing was awaiting confirmation. The
    /// confirmation closes whether or not the removal succeeds.
    ///
    /// # Errors
    ///
    /// Returns the removal error after posting an error notice.
    pub async fn confirm_removal(&mut self) -> Result<bool> {
        let Some(line) = self.pending_removal.take() else {
            return Ok(false);
        };

        match self.cart.remove(&line.id).await {
            Ok(()) => {
                self.notices.success("Item removed");
                Ok(true)
            }
            Err(e) => {
                e.report();
                self.notices.error("Failed to remove item");
                Err(e)
            }
        }
    }
}
