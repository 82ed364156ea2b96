//! Products as listed by the storefront and edited by the admin panel.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::money::Money;
use super::status::ProductStatus;
use super::validation::ValidationErrors;

/// Highest star rating an admin can assign.
pub const MAX_RATING: u8 = 5;

/// A product as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Backend product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Category used for storefront filtering.
    #[serde(default)]
    pub category: String,
    /// List price before discount.
    pub origin_price: Money,
    /// Selling price.
    pub price: Money,
    /// Sales unit (e.g. "bag", "can").
    #[serde(default)]
    pub unit: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Long-form content.
    #[serde(default)]
    pub content: String,
    /// Whether the product is listed.
    #[serde(default)]
    pub is_enabled: ProductStatus,
    /// Main image URL.
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    /// Additional image URLs.
    #[serde(rename = "imagesUrl", default)]
    pub images_url: Vec<String>,
    /// Star rating (0-5), if the admin set one.
    #[serde(default)]
    pub rating: Option<u8>,
}

impl Product {
    /// Main image URL, treating an empty string as absent.
    #[must_use]
    pub fn main_image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Category label, falling back to "Other" when unset.
    #[must_use]
    pub fn category_label(&self) -> &str {
        if self.category.is_empty() {
            "Other"
        } else {
            &self.category
        }
    }
}

/// Pagination metadata for product listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Current page (1-indexed).
    #[serde(default = "first_page")]
    pub current_page: u32,
    /// Whether a previous page exists.
    #[serde(default)]
    pub has_pre: bool,
    /// Whether a next page exists.
    #[serde(default)]
    pub has_next: bool,
    /// Category the listing was filtered by (empty when unfiltered).
    #[serde(default)]
    pub category: String,
}

const fn first_page() -> u32 {
    1
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            total_pages: 0,
            current_page: 1,
            has_pre: false,
            has_next: false,
            category: String::new(),
        }
    }
}

/// One page of products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPage {
    /// Products on this page.
    pub products: Vec<Product>,
    /// Pagination metadata.
    pub pagination: Pagination,
}

/// Product form used by the admin panel to create or edit a product.
///
/// `id` is `None` for a new product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    /// Set when editing an existing product.
    #[serde(skip)]
    pub id: Option<ProductId>,
    /// Display title.
    pub title: String,
    /// Category.
    pub category: String,
    /// List price.
    pub origin_price: Option<Money>,
    /// Selling price.
    pub price: Option<Money>,
    /// Sales unit.
    pub unit: String,
    /// Short description.
    pub description: String,
    /// Long-form content.
    pub content: String,
    /// Whether the product is listed.
    pub is_enabled: ProductStatus,
    /// Main image URL.
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    /// Additional image URLs.
    #[serde(rename = "imagesUrl")]
    pub images_url: Vec<String>,
    /// Star rating (0-5).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

impl ProductDraft {
    /// Whether this draft edits an existing product.
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.id.is_some()
    }

    /// Drop the last additional image, if any.
    pub fn remove_last_image(&mut self) {
        self.images_url.pop();
    }

    /// Check the draft before it is submitted.
    ///
    /// # Errors
    ///
    /// Returns every rejected field: blank required text, missing or
    /// negative prices, and ratings above five stars.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, "Title is required");
        errors.require("category", &self.category, "Category is required");
        errors.require("unit", &self.unit, "Unit is required");
        check_price(&mut errors, "origin_price", self.origin_price, "Original price");
        check_price(&mut errors, "price", self.price, "Price");
        errors.require("description", &self.description, "Description is required");
        errors.require("content", &self.content, "Content is required");
        if self.rating.is_some_and(|r| r > MAX_RATING) {
            errors.push("rating", format!("Rating must be between 0 and {MAX_RATING}"));
        }
        errors.into_result()
    }
}

fn check_price(errors: &mut ValidationErrors, field: &'static str, value: Option<Money>, label: &str) {
    match value {
        None => errors.push(field, format!("{label} is required")),
        Some(amount) if amount.is_negative() => {
            errors.push(field, format!("{label} cannot be negative"));
        }
        Some(_) => {}
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id.clone()),
            title: product.title.clone(),
            category: product.category.clone(),
            origin_price: Some(product.origin_price),
            price: Some(product.price),
            unit: product.unit.clone(),
            description: product.description.clone(),
            content: product.content.clone(),
            is_enabled: product.is_enabled,
            image_url: product.image_url.clone().unwrap_or_default(),
            images_url: product.images_url.clone(),
            rating: product.rating,
        }
    }
}
