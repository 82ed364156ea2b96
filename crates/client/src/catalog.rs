//! Public product catalog.
//!
//! Listing pages and product details are cached for 5 minutes. Category
//! and page are server-side filters; search and sort are applied to the
//! fetched page on the client.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use pawshop_core::{CartIntent, Product, ProductId, ProductPage};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::api::ShopBackend;
use crate::cart::CartSync;
use crate::error::Result;
use crate::notice::Notices;

/// Product ordering for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Server order.
    #[default]
    Default,
    /// Cheapest first.
    PriceLowToHigh,
    /// Most expensive first.
    PriceHighToLow,
    /// Alphabetical by title.
    Name,
}

/// A catalog listing request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductQuery {
    /// Server-side category filter.
    pub category: Option<String>,
    /// Page number (1-based); 0 is treated as 1.
    pub page: u32,
    /// Case-insensitive match against title or description.
    pub search: Option<String>,
    /// Ordering applied after filtering.
    pub sort: SortOrder,
}

impl ProductQuery {
    fn page(&self) -> u32 {
        self.page.max(1)
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// Cached values.
#[derive(Clone)]
enum CacheValue {
    Page(ProductPage),
    Product(Box<Product>),
}

/// Storefront catalog service.
///
/// Cheap to clone; clones share the cache.
pub struct Catalog<B> {
    inner: Arc<CatalogInner<B>>,
}

impl<B> Clone for Catalog<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CatalogInner<B> {
    backend: Arc<B>,
    cart: CartSync<B>,
    notices: Notices,
    cache: Cache<String, CacheValue>,
}

impl<B: ShopBackend> Catalog<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, cart: CartSync<B>, notices: Notices) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogInner {
                backend,
                cart,
                notices,
                cache,
            }),
        }
    }

    /// List products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage> {
        let mut page = self.fetch_page(query.category(), query.page()).await?;

        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            page.products.retain(|p| matches_search(p, &term));
        }
        sort_products(&mut page.products, query.sort);

        Ok(page)
    }

    async fn fetch_page(&self, category: Option<&str>, page: u32) -> Result<ProductPage> {
        let cache_key = format!("products:{}:{page}", category.unwrap_or_default());

        if let Some(CacheValue::Page(cached)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(cached);
        }

        let fetched = self.inner.backend.list_products(category, page).await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Page(fetched.clone()))
            .await;
        Ok(fetched)
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown product (shown as a
    /// placeholder), or the request error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: &ProductId) -> Result<Product> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product = self.inner.backend.get_product(id).await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Put one unit of `product` in the cart.
    ///
    /// # Errors
    ///
    /// Returns the cart error after posting an error notice.
    pub async fn add_to_cart(&self, product: &Product) -> Result<()> {
        self.add_quantity(product, 1).await
    }

    /// Put `qty` units of `product` in the cart.
    ///
    /// # Errors
    ///
    /// Returns the cart error after posting an error notice.
    pub async fn add_quantity(&self, product: &Product, qty: u32) -> Result<()> {
        match self.inner.cart.add(&CartIntent::new(product.id.clone(), qty)).await {
            Ok(()) => {
                self.inner.notices.success("Added to cart");
                Ok(())
            }
            Err(e) => {
                e.report();
                self.inner.notices.error("Failed to add to cart");
                Err(e)
            }
        }
    }

    /// Drop every cached page and product.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

fn matches_search(product: &Product, term: &str) -> bool {
    product.title.to_lowercase().contains(term) || product.description.to_lowercase().contains(term)
}

fn sort_products(products: &mut [Product], order: SortOrder) {
    match order {
        SortOrder::Default => {}
        SortOrder::PriceLowToHigh => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOrder::PriceHighToLow => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::Name => products.sort_by(|a, b| compare_titles(&a.title, &b.title)),
    }
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
