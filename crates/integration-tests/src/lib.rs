//! Integration tests for Pawshop.
//!
//! [`MockShop`] serves the backend's REST contract from an in-process axum
//! server on an ephemeral port, so tests drive the real `HttpBackend`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pawshop-integration-tests
//! ```
//!
//! # Routes
//!
//! ```text
//! POST   /admin/signin                     - Sign in, returns token + expiry
//! POST   /api/user/check                   - Validate the Authorization token
//! GET    /api/{path}/products              - Enabled products, ?category= &page=
//! GET    /api/{path}/product/{id}          - Single product
//! GET    /api/{path}/cart                  - Cart
//! POST   /api/{path}/cart                  - Add to cart
//! PUT    /api/{path}/cart/{id}             - Change quantity
//! DELETE /api/{path}/cart/{id}             - Remove line
//! POST   /api/{path}/order                 - Place order, empties cart
//! GET    /api/{path}/admin/products        - All products (token required)
//! POST   /api/{path}/admin/product         - Create (token required)
//! PUT    /api/{path}/admin/product/{id}    - Update (token required)
//! DELETE /api/{path}/admin/product/{id}    - Delete (token required)
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use pawshop_client::api::HttpBackend;
use pawshop_client::config::ClientConfig;
use pawshop_client::credential::CredentialStore;
use pawshop_client::state::AppState;
use pawshop_core::{
    Cart, CartIntent, CartItemId, CartLine, CartProduct, Money, OrderId, Pagination, Product,
    ProductDraft, ProductId, ProductStatus,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

/// Shop path segment the mock serves under.
pub const API_PATH: &str = "pawshop";
/// Admin account the mock accepts.
pub const ADMIN_USERNAME: &str = "admin@pawshop.test";
pub const ADMIN_PASSWORD: &str = "correct horse";
/// Token issued on sign-in.
pub const ADMIN_TOKEN: &str = "mock-admin-token";

const PAGE_SIZE: usize = 10;

type Reply = (StatusCode, Json<Value>);

fn ok(body: Value) -> Reply {
    (StatusCode::OK, Json(body))
}

fn refused(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "success": false, "message": message })))
}

/// Backend state shared between the server and the test.
#[derive(Default)]
struct ShopData {
    products: Vec<Product>,
    lines: Vec<CartLine>,
    orders: Vec<Value>,
    next_id: u32,
    coupon_percent: Option<u32>,
    failing: HashSet<String>,
    calls: HashMap<String, usize>,
}

impl ShopData {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    /// Count the call; true if the test asked this operation to fail.
    fn enter(&mut self, op: &str) -> bool {
        *self.calls.entry(op.to_string()).or_default() += 1;
        self.failing.contains(op)
    }

    fn cart(&self) -> Cart {
        let mut lines = self.lines.clone();
        if let Some(percent) = self.coupon_percent {
            for line in &mut lines {
                line.final_total = Money::new(
                    line.total.amount() * Decimal::from(percent) / Decimal::ONE_HUNDRED,
                );
            }
        }
        let total = lines
            .iter()
            .fold(Money::default(), |sum, line| sum + line.total);
        let final_total = lines
            .iter()
            .fold(Money::default(), |sum, line| sum + line.final_total);
        Cart {
            lines,
            total,
            final_total,
        }
    }

    fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }
}

fn line_total(price: Money, qty: u32) -> Money {
    Money::new(price.amount() * Decimal::from(qty))
}

/// In-process mock of the shop backend.
#[derive(Clone, Default)]
pub struct MockShop {
    data: Arc<Mutex<ShopData>>,
}

impl MockShop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, ShopData> {
        self.data
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add a product to the catalog.
    #[must_use]
    pub fn with_product(self, product: Product) -> Self {
        self.data().products.push(product);
        self
    }

    /// Apply a coupon: every line's final total becomes `percent`% of its total.
    #[must_use]
    pub fn with_coupon(self, percent: u32) -> Self {
        self.data().coupon_percent = Some(percent);
        self
    }

    /// Make every call to `op` answer with a 500 until [`Self::recover`].
    pub fn fail(&self, op: &str) {
        self.data().failing.insert(op.to_string());
    }

    pub fn recover(&self, op: &str) {
        self.data().failing.remove(op);
    }

    /// Number of requests served for `op`.
    #[must_use]
    pub fn calls(&self, op: &str) -> usize {
        self.data().calls.get(op).copied().unwrap_or_default()
    }

    /// Cart lines as the backend holds them.
    #[must_use]
    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.data().lines.clone()
    }

    /// Order bodies received so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.data().orders.clone()
    }

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.data().products.clone()
    }

    fn router(&self) -> Router {
        let shop = Router::new()
            .route("/products", get(list_products))
            .route("/product/{id}", get(get_product))
            .route("/cart", get(get_cart).post(add_cart_item))
            .route("/cart/{id}", put(update_cart_item).delete(remove_cart_item))
            .route("/order", post(place_order))
            .route("/admin/products", get(admin_list_products))
            .route("/admin/product", post(admin_create_product))
            .route(
                "/admin/product/{id}",
                put(admin_update_product).delete(admin_delete_product),
            );

        Router::new()
            .route("/admin/signin", post(sign_in))
            .route("/api/user/check", post(check_session))
            .nest(&format!("/api/{API_PATH}"), shop)
            .with_state(self.clone())
    }

    /// Serve on an ephemeral localhost port.
    pub async fn start(self) -> MockServer {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock backend stopped");
        });
        MockServer { addr, shop: self }
    }
}

/// A running mock backend.
pub struct MockServer {
    addr: SocketAddr,
    pub shop: MockShop,
}

impl MockServer {
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url(), API_PATH).expect("Mock backend URL is valid")
    }

    /// Application state wired to this backend with an empty credential store.
    #[must_use]
    pub fn app(&self) -> AppState<HttpBackend> {
        let config = self.config();
        let credentials = CredentialStore::in_memory(config.cookie_name.clone());
        let backend =
            HttpBackend::new(config.clone(), credentials.clone()).expect("HTTP client builds");
        AppState::with_backend(config, backend, credentials)
    }
}

/// A catalog product priced in whole dollars.
#[must_use]
pub fn product(id: &str, title: &str, category: &str, price: i64) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        category: category.to_string(),
        origin_price: Money::from_dollars(price),
        price: Money::from_dollars(price),
        unit: "pc".to_string(),
        description: format!("{title} for happy pets"),
        content: String::new(),
        is_enabled: ProductStatus::Enabled,
        image_url: None,
        images_url: Vec::new(),
        rating: None,
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|token| token == ADMIN_TOKEN)
}

#[derive(Deserialize)]
struct SignIn {
    username: String,
    password: String,
}

async fn sign_in(State(shop): State<MockShop>, Json(body): Json<SignIn>) -> Reply {
    if shop.data().enter("login") {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    if body.username != ADMIN_USERNAME || body.password != ADMIN_PASSWORD {
        return refused(StatusCode::BAD_REQUEST, "Login failed");
    }
    let expired = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp_millis();
    ok(json!({
        "success": true,
        "message": "Signed in",
        "uid": "admin-uid",
        "token": ADMIN_TOKEN,
        "expired": expired,
    }))
}

async fn check_session(State(shop): State<MockShop>, headers: HeaderMap) -> Reply {
    if shop.data().enter("validate_session") {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    if authorized(&headers) {
        ok(json!({ "success": true }))
    } else {
        refused(StatusCode::FORBIDDEN, "Please sign in again")
    }
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    page: Option<usize>,
}

fn paginate(products: &[Product], page: usize, category: &str) -> Value {
    let total_pages = products.len().div_ceil(PAGE_SIZE);
    let page = page.max(1);
    let slice: Vec<&Product> = products
        .iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();
    let pagination = Pagination {
        total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        current_page: u32::try_from(page).unwrap_or(u32::MAX),
        has_pre: page > 1,
        has_next: page < total_pages,
        category: category.to_string(),
    };
    json!({ "success": true, "products": slice, "pagination": pagination })
}

async fn list_products(State(shop): State<MockShop>, Query(query): Query<ListQuery>) -> Reply {
    let mut data = shop.data();
    if data.enter("list_products") {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    let category = query.category.unwrap_or_default();
    let listed: Vec<Product> = data
        .products
        .iter()
        .filter(|p| p.is_enabled.is_enabled())
        .filter(|p| category.is_empty() || p.category == category)
        .cloned()
        .collect();
    ok(paginate(&listed, query.page.unwrap_or(1), &category))
}

async fn get_product(State(shop): State<MockShop>, Path(id): Path<String>) -> Reply {
    let mut data = shop.data();
    if data.enter("get_product") {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    match data.product(&ProductId::new(id)) {
        Some(product) => ok(json!({ "success": true, "product": product })),
        None => refused(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn get_cart(State(shop): State<MockShop>) -> Reply {
    let mut data = shop.data();
    if data.enter("get_cart") {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    ok(json!({ "success": true, "data": data.cart() }))
}

#[derive(Deserialize)]
struct DataBody<T> {
    data: T,
}

async fn add_cart_item(
    State(shop): State<MockShop>,
    Json(body): Json<DataBody<CartIntent>>,
) -> Reply {
    let mut data = shop.data();
    if data.enter("add_cart_item") {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    let intent = body.data;
    let Some(product) = data.product(&intent.product_id).cloned() else {
        return refused(StatusCode::BAD_REQUEST, "Product not found");
    };

    if let Some(line) = data.lines.iter_mut().find(|l| l.product.id == product.id) {
        line.qty += intent.qty;
        line.total = line_total(product.price, line.qty);
        line.final_total = line.total;
    } else {
        let id = CartItemId::new(data.next_id("line"));
        let total = line_total(product.price, intent.qty);
        data.lines.push(CartLine {
            id,
            product: CartProduct {
                id: product.id.clone(),
                title: product.title.clone(),
                price: product.price,
                unit: product.unit.clone(),
                image_url: product.image_url.clone(),
            },
            qty: intent.qty,
            total,
            final_total: total,
        });
    }
    ok(json!({ "success": true, "message": "Added to cart" }))
}

async fn update_cart_item(
    State(shop): State<MockShop>,
    Path(id): Path<String>,
    Json(body): Json<DataBody<CartIntent>>,
) -> Reply {
    let mut data = shop.data();
    if data.enter("update_cart_item") {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    let id = CartItemId::new(id);
    let Some(line) = data.lines.iter_mut().find(|l| l.id == id) else {
        return refused(StatusCode::BAD_REQUEST, "Cart line not found");
    };
    line.qty = body.data.qty;
    line.total = line_total(line.product.price, line.qty);
    line.final_total = line.total;
    ok(json!({ "success": true, "message": "Updated" }))
}

async fn remove_cart_item(State(shop): State<MockShop>, Path(id): Path<String>) -> Reply {
    let mut data = shop.data();
    if data.enter("remove_cart_item") {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    let id = CartItemId::new(id);
    let before = data.lines.len();
    data.lines.retain(|l| l.id != id);
    if data.lines.len() == before {
        return refused(StatusCode::BAD_REQUEST, "Cart line not found");
    }
    ok(json!({ "success": true, "message": "Removed" }))
}

async fn place_order(State(shop): State<MockShop>, Json(body): Json<DataBody<Value>>) -> Reply {
    let mut data = shop.data();
    if data.enter("checkout") {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    if data.lines.is_empty() {
        return refused(StatusCode::BAD_REQUEST, "Cart is empty");
    }
    let total = data.cart().final_total;
    let order_id = OrderId::new(data.next_id("order"));
    data.orders.push(body.data);
    data.lines.clear();
    ok(json!({
        "success": true,
        "message": "Order created",
        "orderId": order_id,
        "total": total,
        "create_at": chrono::Utc::now().timestamp(),
    }))
}

async fn admin_list_products(
    State(shop): State<MockShop>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Reply {
    let mut data = shop.data();
    if data.enter("admin_list_products") {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    if !authorized(&headers) {
        return refused(StatusCode::FORBIDDEN, "Please sign in again");
    }
    ok(paginate(&data.products, query.page.unwrap_or(1), ""))
}

fn draft_product(id: ProductId, draft: ProductDraft) -> Product {
    Product {
        id,
        title: draft.title,
        category: draft.category,
        origin_price: draft.origin_price.unwrap_or_default(),
        price: draft.price.unwrap_or_default(),
        unit: draft.unit,
        description: draft.description,
        content: draft.content,
        is_enabled: draft.is_enabled,
        image_url: Some(draft.image_url).filter(|url| !url.is_empty()),
        images_url: draft.images_url,
        rating: draft.rating,
    }
}

async fn admin_create_product(
    State(shop): State<MockShop>,
    headers: HeaderMap,
    Json(body): Json<DataBody<ProductDraft>>,
) -> Reply {
    let mut data = shop.data();
    if data.enter("admin_create_product") {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    if !authorized(&headers) {
        return refused(StatusCode::FORBIDDEN, "Please sign in again");
    }
    let id = ProductId::new(data.next_id("product"));
    data.products.push(draft_product(id, body.data));
    ok(json!({ "success": true, "message": "Product created" }))
}

async fn admin_update_product(
    State(shop): State<MockShop>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<DataBody<ProductDraft>>,
) -> Reply {
    let mut data = shop.data();
    if data.enter("admin_update_product") {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    if !authorized(&headers) {
        return refused(StatusCode::FORBIDDEN, "Please sign in again");
    }
    let id = ProductId::new(id);
    let Some(slot) = data.products.iter_mut().find(|p| p.id == id) else {
        return refused(StatusCode::NOT_FOUND, "Product not found");
    };
    *slot = draft_product(id, body.data);
    ok(json!({ "success": true, "message": "Product updated" }))
}

async fn admin_delete_product(
    State(shop): State<MockShop>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut data = shop.data();
    if data.enter("admin_delete_product") {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    if !authorized(&headers) {
        return refused(StatusCode::FORBIDDEN, "Please sign in again");
    }
    let id = ProductId::new(id);
    let before = data.products.len();
    data.products.retain(|p| p.id != id);
    if data.products.len() == before {
        return refused(StatusCode::NOT_FOUND, "Product not found");
    }
    ok(json!({ "success": true, "message": "Product deleted" }))
}
