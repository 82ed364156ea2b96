//! Cart synchronizer.
//!
//! The backend owns the cart. This module keeps one published copy of it
//! (the badge count and the latest listing) that every view subscribes to.
//! Mutations are never applied locally: each successful mutation is
//! followed by a fresh `GetCart`, and the published count is always the
//! line count of the most recent response.

use std::sync::Arc;

use pawshop_core::{Cart, CartIntent, CartItemId};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::api::ShopBackend;
use crate::error::{Result, add_breadcrumb};

/// Shared cart state.
///
/// Cheap to clone; every clone publishes to the same subscribers.
pub struct CartSync<B> {
    inner: Arc<CartSyncInner<B>>,
}

impl<B> Clone for CartSync<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CartSyncInner<B> {
    backend: Arc<B>,
    count: watch::Sender<usize>,
    snapshot: watch::Sender<Option<Cart>>,
}

impl<B: ShopBackend> CartSync<B> {
    /// Create a synchronizer with a count of zero and no loaded cart.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        let (count, _) = watch::channel(0);
        let (snapshot, _) = watch::channel(None);
        Self {
            inner: Arc::new(CartSyncInner {
                backend,
                count,
                snapshot,
            }),
        }
    }

    /// Subscribe to the item count (header badge).
    #[must_use]
    pub fn subscribe_count(&self) -> watch::Receiver<usize> {
        self.inner.count.subscribe()
    }

    /// Subscribe to the full cart listing. `None` until the cart has loaded.
    #[must_use]
    pub fn subscribe_cart(&self) -> watch::Receiver<Option<Cart>> {
        self.inner.snapshot.subscribe()
    }

    /// The currently published item count.
    #[must_use]
    pub fn count(&self) -> usize {
        *self.inner.count.borrow()
    }

    /// The most recently loaded cart, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Cart> {
        self.inner.snapshot.borrow().clone()
    }

    /// Fetch the cart and publish it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be fetched; the published state
    /// is left untouched.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Cart> {
        let cart = self.inner.backend.get_cart().await?;
        self.publish(&cart);
        Ok(cart)
    }

    /// Re-derive the item count from the server.
    ///
    /// A failure is logged and leaves the published count as it was.
    /// Concurrent refreshes are fine; whichever response lands last wins.
    pub async fn refresh_count(&self) -> Option<usize> {
        match self.load().await {
            Ok(cart) => Some(cart.item_count()),
            Err(e) => {
                warn!(error = %e, "Cart refresh failed, keeping previous count");
                None
            }
        }
    }

    /// Add a product to the cart, then refresh.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged; nothing is published on failure.
    #[instrument(skip(self), fields(product_id = %intent.product_id, qty = intent.qty))]
    pub async fn add(&self, intent: &CartIntent) -> Result<()> {
        add_breadcrumb("cart", "Add item", Some(&[("product_id", intent.product_id.as_str())]));
        self.inner.backend.add_cart_item(intent).await?;
        self.refresh_count().await;
        Ok(())
    }

    /// Change a line's quantity, then refresh.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged; nothing is published on failure.
    #[instrument(skip(self), fields(line_id = %id, qty = intent.qty))]
    pub async fn update(&self, id: &CartItemId, intent: &CartIntent) -> Result<()> {
        add_breadcrumb("cart", "Update quantity", Some(&[("line_id", id.as_str())]));
        self.inner.backend.update_cart_item(id, intent).await?;
        self.refresh_count().await;
        Ok(())
    }

    /// Remove a line, then refresh.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged; nothing is published on failure.
    #[instrument(skip(self), fields(line_id = %id))]
    pub async fn remove(&self, id: &CartItemId) -> Result<()> {
        add_breadcrumb("cart", "Remove item", Some(&[("line_id", id.as_str())]));
        self.inner.backend.remove_cart_item(id).await?;
        self.refresh_count().await;
        Ok(())
    }

    fn publish(&self, cart: &Cart) {
        let count = cart.item_count();
        self.inner.count.send_replace(count);
        self.inner.snapshot.send_replace(Some(cart.clone()));
        debug!(count, "Cart published");
    }
}
