//! Admin product manager: paginated listing, create/edit, and delete with
//! confirmation.
//!
//! Every backend call here needs the admin credential. A rejected
//! credential comes back as [`ClientError::AuthFailure`]; callers turn it
//! into the login redirect with [`ClientError::redirect`] rather than
//! showing an error.

use std::sync::Arc;

use pawshop_core::{Pagination, Product, ProductDraft};
use tracing::{info, instrument};

use crate::api::ShopBackend;
use crate::error::{ClientError, Result, add_breadcrumb};
use crate::notice::Notices;

/// Admin product manager.
pub struct AdminProducts<B> {
    backend: Arc<B>,
    notices: Notices,
    products: Vec<Product>,
    pagination: Pagination,
    pending_delete: Option<Product>,
}

impl<B: ShopBackend> AdminProducts<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, notices: Notices) -> Self {
        Self {
            backend,
            notices,
            products: Vec::new(),
            pagination: Pagination::default(),
            pending_delete: None,
        }
    }

    /// Products on the current page.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Pagination of the last loaded page.
    #[must_use]
    pub const fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Load `page`, or reload the current page when `None`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::AuthFailure` if the session lapsed, or the
    /// request error after posting a notice.
    #[instrument(skip(self))]
    pub async fn list(&mut self, page: Option<u32>) -> Result<&[Product]> {
        let page = page.unwrap_or(self.pagination.current_page).max(1);
        let loaded = self
            .backend
            .admin_list_products(page)
            .await
            .map_err(|e| self.fail(e.into(), "Failed to load products"))?;

        self.products = loaded.products;
        self.pagination = loaded.pagination;
        Ok(&self.products)
    }

    /// Create or update a product from `draft`, then reload the list.
    ///
    /// A draft without an `id` creates a new product.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` without contacting the server when
    /// the draft is incomplete, `ClientError::AuthFailure` if the session
    /// lapsed, or the request error after posting the server's message.
    #[instrument(skip(self, draft), fields(product_id = ?draft.id, title = %draft.title))]
    pub async fn save(&mut self, draft: &ProductDraft) -> Result<()> {
        draft.validate()?;

        let (result, done) = match &draft.id {
            Some(id) => {
                add_breadcrumb("admin", "Update product", Some(&[("product_id", id.as_str())]));
                (
                    self.backend.admin_update_product(id, draft).await,
                    "Product updated",
                )
            }
            None => {
                add_breadcrumb("admin", "Create product", None);
                (self.backend.admin_create_product(draft).await, "Product created")
            }
        };
        result.map_err(|e| self.fail(e.into(), "Operation failed"))?;

        info!("{done}");
        self.notices.success(done);
        self.list(None).await?;
        Ok(())
    }

    /// Ask for confirmation before deleting `product`.
    pub fn request_delete(&mut self, product: &Product) {
        self.pending_delete = Some(product.clone());
    }

    /// The product awaiting delete confirmation, if any.
    #[must_use]
    pub const fn pending_delete(&self) -> Option<&Product> {
        self.pending_delete.as_ref()
    }

    /// Close the confirmation without deleting.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the product awaiting confirmation, then reload the list.
    ///
    /// Returns `Ok(false)` when nothing was awaiting confirmation.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::AuthFailure` if the session lapsed, or the
    /// request error after posting a notice.
    pub async fn confirm_delete(&mut self) -> Result<bool> {
        let Some(product) = self.pending_delete.take() else {
            return Ok(false);
        };

        add_breadcrumb("admin", "Delete product", Some(&[("product_id", product.id.as_str())]));
        self.backend
            .admin_delete_product(&product.id)
            .await
            .map_err(|e| self.fail(e.into(), "Failed to delete product"))?;

        info!(product_id = %product.id, "Product deleted");
        self.notices.success("Product deleted");
        self.list(None).await?;
        Ok(true)
    }

    /// Report a failed call; auth failures stay silent.
    fn fail(&self, err: ClientError, fallback: &str) -> ClientError {
        err.report();
        if err.is_user_visible() {
            self.notices.error(err.user_message(fallback));
        }
        err
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pawshop_core::{Money, ProductId};

    use super::*;
    use crate::notice::drain;
    use crate::testing::{FakeBackend, Failure, product};

    fn draft() -> ProductDraft {
        ProductDraft {
            title: "Salmon treats".to_string(),
            category: "food".to_string(),
            origin_price: Some(Money::from_dollars(300)),
            price: Some(Money::from_dollars(250)),
            unit: "bag".to_string(),
            description: "Crunchy".to_string(),
            content: "Made with wild salmon".to_string(),
            ..ProductDraft::default()
        }
    }

    fn manager(backend: FakeBackend) -> (AdminProducts<FakeBackend>, Arc<FakeBackend>, Notices) {
        let backend = Arc::new(backend);
        let notices = Notices::new();
        (
            AdminProducts::new(Arc::clone(&backend), notices.clone()),
            backend,
            notices,
        )
    }

    #[tokio::test]
    async fn test_list_includes_disabled_products() {
        let mut hidden = product("p-2", "Old leash", 90);
        hidden.is_enabled = pawshop_core::ProductStatus::Disabled;
        let (mut admin, _, _) =
            manager(FakeBackend::new().with_products(vec![product("p-1", "Ball", 100), hidden]));

        let products = admin.list(Some(1)).await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(admin.pagination().current_page, 1);
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let (mut admin, backend, notices) = manager(FakeBackend::new());
        let mut received = notices.subscribe();

        admin.save(&draft()).await.unwrap();
        admin
            .save(&ProductDraft {
                id: Some(ProductId::new("p-9")),
                ..draft()
            })
            .await
            .unwrap();

        assert_eq!(backend.calls("admin_create_product"), 1);
        assert_eq!(backend.calls("admin_update_product"), 1);
        assert_eq!(backend.calls("admin_list_products"), 2);
        let messages: Vec<String> = drain(&mut received).into_iter().map(|n| n.message).collect();
        assert_eq!(messages, ["Product created", "Product updated"]);
    }

    #[tokio::test]
    async fn test_invalid_draft_sends_nothing() {
        let (mut admin, backend, _) = manager(FakeBackend::new());
        let err = admin
            .save(&ProductDraft {
                price: None,
                ..draft()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(backend.calls("admin_create_product"), 0);
    }

    #[tokio::test]
    async fn test_server_rejection_shows_joined_message() {
        let (mut admin, backend, notices) = manager(FakeBackend::new());
        let mut received = notices.subscribe();
        backend.fail(
            "admin_create_product",
            Failure::Rejected("title taken price too low".to_string()),
        );

        assert!(admin.save(&draft()).await.is_err());
        assert_eq!(drain(&mut received)[0].message, "title taken price too low");

        backend.fail("admin_create_product", Failure::Timeout);
        assert!(admin.save(&draft()).await.is_err());
        assert_eq!(drain(&mut received)[0].message, "Operation failed");
    }

    #[tokio::test]
    async fn test_lapsed_session_redirects_silently() {
        let (mut admin, backend, notices) = manager(FakeBackend::new());
        let mut received = notices.subscribe();
        backend.fail("admin_list_products", Failure::Unauthorized);

        let err = admin.list(None).await.unwrap_err();

        assert_eq!(
            err.redirect().map(|r| r.to),
            Some(pawshop_core::Route::Login)
        );
        assert!(drain(&mut received).is_empty());
    }

    #[tokio::test]
    async fn test_delete_confirmation_flow() {
        let ball = product("p-1", "Ball", 100);
        let (mut admin, backend, _) = manager(FakeBackend::new().with_products(vec![ball.clone()]));
        admin.list(None).await.unwrap();

        admin.request_delete(&ball);
        admin.cancel_delete();
        assert!(!admin.confirm_delete().await.unwrap());
        assert_eq!(backend.calls("admin_delete_product"), 0);

        admin.request_delete(&ball);
        assert_eq!(admin.pending_delete(), Some(&ball));
        assert!(admin.confirm_delete().await.unwrap());
        assert!(admin.products().is_empty());
        assert!(admin.pending_delete().is_none());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_product_and_notifies() {
        let ball = product("p-1", "Ball", 100);
        let (mut admin, backend, notices) =
            manager(FakeBackend::new().with_products(vec![ball.clone()]));
        admin.list(None).await.unwrap();
        let mut received = notices.subscribe();
        backend.fail("admin_delete_product", Failure::Timeout);

        admin.request_delete(&ball);
        assert!(admin.confirm_delete().await.is_err());

        assert!(admin.pending_delete().is_none());
        assert_eq!(admin.products().len(), 1);
        let messages: Vec<String> = drain(&mut received).into_iter().map(|n| n.message).collect();
        assert_eq!(messages, ["Failed to delete product"]);
    }
}
