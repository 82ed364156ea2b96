//! `reqwest` implementation of [`ShopBackend`].

use std::sync::Arc;

use pawshop_core::{
    Cart, CartIntent, CartItemId, Credential, Email, OrderPayload, OrderReceipt, Product,
    ProductDraft, ProductId, ProductPage,
};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::wire::{
    CartBody, Data, Empty, Envelope, Message, ProductBody, ProductsBody, SignInBody, SignInRequest,
    Status,
};
use super::{ApiError, ShopBackend};
use crate::config::ClientConfig;
use crate::credential::CredentialStore;

/// Longest slice of a response body written to the log.
const LOG_BODY_LIMIT: usize = 500;

/// HTTP client for the shop backend.
///
/// Attaches the stored admin token as the raw `Authorization` header value on
/// every request when one is present.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    config: ClientConfig,
    credentials: CredentialStore,
}

impl HttpBackend {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, credentials: CredentialStore) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpBackendInner {
                client,
                config,
                credentials,
            }),
        })
    }

    /// Send a request and decode the envelope's payload.
    async fn execute<B, T>(&self, method: Method, url: String, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.inner.client.request(method.clone(), &url);
        if let Some(credential) = self.inner.credentials.get() {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                credential.token().expose_secret(),
            );
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        let envelope: Envelope<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    %method,
                    %url,
                    body = %truncate(&text),
                    "Failed to parse backend response"
                );
                return Err(ApiError::Parse(e));
            }
        };

        if !envelope.success {
            let message = envelope.message.map(Message::joined).unwrap_or_default();
            debug!(%method, %url, %message, "Backend refused request");
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(envelope.body)
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        self.execute::<(), T>(Method::GET, url, None).await
    }

    async fn send_data<B: Serialize + Sync>(&self, method: Method, url: String, data: &B) -> Result<(), ApiError> {
        self.execute::<_, Empty>(method, url, Some(&Data { data }))
            .await
            .map(|_| ())
    }

    async fn delete(&self, url: String) -> Result<(), ApiError> {
        self.execute::<(), Empty>(Method::DELETE, url, None)
            .await
            .map(|_| ())
    }
}

impl ShopBackend for HttpBackend {
    #[instrument(skip(self))]
    async fn validate_session(&self) -> Result<(), ApiError> {
        let url = self.inner.config.endpoint("/api/user/check");
        self.execute::<(), Empty>(Method::POST, url, None)
            .await
            .map(|_| ())
    }

    #[instrument(skip(self, password), fields(username = %username))]
    async fn login(&self, username: &Email, password: &SecretString) -> Result<Credential, ApiError> {
        let url = self.inner.config.endpoint("/admin/signin");
        let body = SignInRequest {
            username: username.as_str(),
            password: password.expose_secret(),
        };
        let SignInBody { token, expired } = self.execute(Method::POST, url, Some(&body)).await?;

        Credential::from_unix_millis(token, expired).ok_or_else(|| ApiError::Rejected {
            status: StatusCode::OK.as_u16(),
            message: format!("invalid token expiry {expired}"),
        })
    }

    #[instrument(skip(self))]
    async fn get_cart(&self) -> Result<Cart, ApiError> {
        let body: CartBody = self.get(self.inner.config.shop_endpoint("/cart")).await?;
        Ok(body.data)
    }

    #[instrument(skip(self), fields(product_id = %intent.product_id, qty = intent.qty))]
    async fn add_cart_item(&self, intent: &CartIntent) -> Result<(), ApiError> {
        let url = self.inner.config.shop_endpoint("/cart");
        self.send_data(Method::POST, url, intent).await
    }

    #[instrument(skip(self), fields(line_id = %id, qty = intent.qty))]
    async fn update_cart_item(&self, id: &CartItemId, intent: &CartIntent) -> Result<(), ApiError> {
        let url = self.inner.config.shop_endpoint(&format!("/cart/{id}"));
        self.send_data(Method::PUT, url, intent).await
    }

    #[instrument(skip(self), fields(line_id = %id))]
    async fn remove_cart_item(&self, id: &CartItemId) -> Result<(), ApiError> {
        self.delete(self.inner.config.shop_endpoint(&format!("/cart/{id}")))
            .await
    }

    #[instrument(skip(self, order))]
    async fn checkout(&self, order: &OrderPayload) -> Result<OrderReceipt, ApiError> {
        let url = self.inner.config.shop_endpoint("/order");
        self.execute(Method::POST, url, Some(&Data { data: order }))
            .await
    }

    #[instrument(skip(self))]
    async fn list_products(&self, category: Option<&str>, page: u32) -> Result<ProductPage, ApiError> {
        let mut url = self.inner.config.shop_endpoint(&format!("/products?page={page}"));
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            url.push_str("&category=");
            url.push_str(&url::form_urlencoded::byte_serialize(category.as_bytes()).collect::<String>());
        }
        let body: ProductsBody = self.get(url).await?;
        Ok(ProductPage {
            products: body.products,
            pagination: body.pagination,
        })
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let body: ProductBody = self
            .get(self.inner.config.shop_endpoint(&format!("/product/{id}")))
            .await?;
        body.product
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))
    }

    #[instrument(skip(self))]
    async fn admin_list_products(&self, page: u32) -> Result<ProductPage, ApiError> {
        let url = self
            .inner
            .config
            .shop_endpoint(&format!("/admin/products?page={page}"));
        let body: ProductsBody = self.get(url).await?;
        Ok(ProductPage {
            products: body.products,
            pagination: body.pagination,
        })
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    async fn admin_create_product(&self, draft: &ProductDraft) -> Result<(), ApiError> {
        let url = self.inner.config.shop_endpoint("/admin/product");
        self.send_data(Method::POST, url, draft).await
    }

    #[instrument(skip(self, draft), fields(product_id = %id))]
    async fn admin_update_product(&self, id: &ProductId, draft: &ProductDraft) -> Result<(), ApiError> {
        let url = self
            .inner
            .config
            .shop_endpoint(&format!("/admin/product/{id}"));
        self.send_data(Method::PUT, url, draft).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn admin_delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        self.delete(
            self.inner
                .config
                .shop_endpoint(&format!("/admin/product/{id}")),
        )
        .await
    }
}

fn map_transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Http(e)
    }
}

/// Map a non-2xx response to an error, keeping the backend's message.
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<Status>(body)
        .ok()
        .and_then(|s| s.message)
        .map_or_else(|| truncate(body), Message::joined);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => {
            tracing::error!(
                status = %status,
                body = %truncate(body),
                "Backend returned non-success status"
            );
            ApiError::Rejected {
                status: status.as_u16(),
                message,
            }
        }
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}
