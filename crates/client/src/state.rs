//! Application state shared by every view.

use std::sync::Arc;

use thiserror::Error;

use crate::admin::AdminProducts;
use crate::api::{ApiError, HttpBackend, ShopBackend};
use crate::auth::Auth;
use crate::cart::CartSync;
use crate::catalog::Catalog;
use crate::checkout::Checkout;
use crate::config::ClientConfig;
use crate::credential::{CredentialError, CredentialStore};
use crate::guard::SessionGuard;
use crate::notice::Notices;
use crate::router::Router;
use crate::views::CartPage;

/// Error creating the application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("credential store: {0}")]
    Credential(#[from] CredentialError),
    #[error("HTTP client: {0}")]
    Http(#[from] ApiError),
}

/// Application state shared across all views.
///
/// This struct is cheaply cloneable via `Arc`. It is created once at app
/// start; the cart count, guard state and notices it holds are the single
/// shared copies every view subscribes to.
pub struct AppState<B = HttpBackend> {
    inner: Arc<AppStateInner<B>>,
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<B> {
    config: ClientConfig,
    backend: Arc<B>,
    credentials: CredentialStore,
    notices: Notices,
    cart: CartSync<B>,
    guard: SessionGuard<B>,
    catalog: Catalog<B>,
    auth: Auth<B>,
}

impl AppState {
    /// Create the state with the HTTP backend.
    ///
    /// The credential is loaded from `config.credential_file` when set.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential file cannot be read or the HTTP
    /// client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, StateError> {
        let credentials = match &config.credential_file {
            Some(file) => CredentialStore::with_file(config.cookie_name.clone(), file)?,
            None => CredentialStore::in_memory(config.cookie_name.clone()),
        };
        let backend = HttpBackend::new(config.clone(), credentials.clone())?;
        Ok(Self::with_backend(config, backend, credentials))
    }
}

impl<B: ShopBackend> AppState<B> {
    /// Create the state around an existing backend.
    #[must_use]
    pub fn with_backend(config: ClientConfig, backend: B, credentials: CredentialStore) -> Self {
        let backend = Arc::new(backend);
        let notices = Notices::new();
        let cart = CartSync::new(Arc::clone(&backend));
        let guard = SessionGuard::new(Arc::clone(&backend), credentials.clone());
        let catalog = Catalog::new(Arc::clone(&backend), cart.clone(), notices.clone());
        let auth = Auth::new(Arc::clone(&backend), credentials.clone(), notices.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                credentials,
                notices,
                cart,
                guard,
                catalog,
                auth,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.inner.backend
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    #[must_use]
    pub fn notices(&self) -> &Notices {
        &self.inner.notices
    }

    /// The shared cart synchronizer.
    #[must_use]
    pub fn cart(&self) -> &CartSync<B> {
        &self.inner.cart
    }

    #[must_use]
    pub fn guard(&self) -> &SessionGuard<B> {
        &self.inner.guard
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog<B> {
        &self.inner.catalog
    }

    #[must_use]
    pub fn auth(&self) -> &Auth<B> {
        &self.inner.auth
    }

    /// A router over the shared guard.
    #[must_use]
    pub fn router(&self) -> Router<B> {
        Router::new(self.inner.guard.clone())
    }

    /// A cart page controller over the shared cart.
    #[must_use]
    pub fn cart_page(&self) -> CartPage<B> {
        CartPage::new(
            self.inner.cart.clone(),
            self.inner.notices.clone(),
            self.inner.config.shipping,
        )
    }

    /// A checkout controller over the shared cart.
    #[must_use]
    pub fn checkout(&self) -> Checkout<B> {
        Checkout::new(
            Arc::clone(&self.inner.backend),
            self.inner.cart.clone(),
            self.inner.notices.clone(),
            self.inner.config.shipping,
        )
    }

    /// An admin product manager.
    #[must_use]
    pub fn admin_products(&self) -> AdminProducts<B> {
        AdminProducts::new(Arc::clone(&self.inner.backend), self.inner.notices.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pawshop_core::{CartIntent, NavigationState, Route};
    use secrecy::SecretString;

    use super::*;
    use crate::router::Navigation;
    use crate::testing::{FakeBackend, VALID_PASSWORD};

    fn state() -> AppState<FakeBackend> {
        AppState::with_backend(
            ClientConfig::new("http://localhost:3000", "pawshop").unwrap(),
            FakeBackend::new(),
            CredentialStore::in_memory("pawshopToken"),
        )
    }

    #[tokio::test]
    async fn test_views_share_one_cart_count() {
        let state = state();
        let badge = state.cart().subscribe_count();
        let page = state.cart_page();

        state
            .cart()
            .add(&CartIntent::new("p-1", 1))
            .await
            .unwrap();

        assert_eq!(*badge.borrow(), 1);
        assert!(!page.summary().is_empty);
        assert_eq!(state.clone().cart().count(), 1);
    }

    #[tokio::test]
    async fn test_login_then_admin_without_second_check() {
        let state = state();
        let mut router = state.router();
        router.navigate("/login", NavigationState::default()).await;

        let redirect = state
            .auth()
            .login(
                &pawshop_core::Email::parse("admin@pawshop.test").unwrap(),
                &SecretString::from(VALID_PASSWORD),
            )
            .await
            .unwrap();

        assert_eq!(
            router.follow(redirect).await,
            Navigation::Rendered(Route::AdminProducts)
        );
        assert_eq!(state.backend().calls("validate_session"), 0);
    }

    #[tokio::test]
    async fn test_new_with_http_backend() {
        let config = ClientConfig::new("http://localhost:3000", "pawshop").unwrap();
        let state = AppState::new(config).unwrap();
        assert!(state.credentials().get().is_none());
        assert_eq!(state.cart().count(), 0);
    }
}
