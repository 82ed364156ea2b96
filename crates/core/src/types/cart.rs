//! Server-owned shopping cart.
//!
//! The client mirrors what the backend returns and never derives totals or
//! counts of its own beyond counting the lines in the latest response.

use serde::{Deserialize, Serialize};

use super::id::{CartItemId, ProductId};
use super::money::Money;

/// The subset of product data embedded in each cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    /// Product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Money,
    /// Sales unit.
    #[serde(default)]
    pub unit: String,
    /// Main image URL.
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart line ID (distinct from the product ID).
    pub id: CartItemId,
    /// Product being bought.
    pub product: CartProduct,
    /// Quantity.
    pub qty: u32,
    /// Line total before discounts.
    pub total: Money,
    /// Line total after discounts.
    pub final_total: Money,
}

impl CartLine {
    /// Mutation intent that sets this line to `qty`.
    #[must_use]
    pub fn with_qty(&self, qty: u32) -> CartIntent {
        CartIntent {
            product_id: self.product.id.clone(),
            qty,
        }
    }
}

/// The cart as the backend reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart lines.
    #[serde(rename = "carts", default)]
    pub lines: Vec<CartLine>,
    /// Subtotal before discounts.
    #[serde(default)]
    pub total: Money,
    /// Amount payable.
    #[serde(default)]
    pub final_total: Money,
}

impl Cart {
    /// Number of items shown on the cart badge: one per line.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find a line by ID.
    #[must_use]
    pub fn line(&self, id: &CartItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }
}

/// A requested cart change, before the server confirms it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartIntent {
    /// Product to add or update.
    pub product_id: ProductId,
    /// Requested quantity.
    pub qty: u32,
}

impl CartIntent {
    /// Intent for `qty` units of `product_id`.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, qty: u32) -> Self {
        Self {
            product_id: product_id.into(),
            qty,
        }
    }
}
