//! In-memory [`ShopBackend`] used by unit tests.
//!
//! Keeps a cart and a product list, counts calls per operation, and can be
//! told to fail an operation or hold `validate_session` until released.

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pawshop_core::{
    Cart, CartIntent, CartItemId, CartLine, CartProduct, Credential, Email, Money, OrderId,
    OrderPayload, OrderReceipt, Pagination, Product, ProductDraft, ProductId, ProductPage,
    ProductStatus,
};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Notify;

use crate::api::{ApiError, ShopBackend};

pub const VALID_PASSWORD: &str = "correct horse";

/// How a failing operation fails.
#[derive(Debug, Clone)]
pub enum Failure {
    Timeout,
    Unauthorized,
    NotFound,
    Rejected(String),
}

impl Failure {
    fn to_error(&self) -> ApiError {
        match self {
            Self::Timeout => ApiError::Timeout,
            Self::Unauthorized => ApiError::Unauthorized("token expired".to_string()),
            Self::NotFound => ApiError::NotFound("not found".to_string()),
            Self::Rejected(message) => ApiError::Rejected {
                status: 400,
                message: message.clone(),
            },
        }
    }
}

#[derive(Default)]
struct FakeState {
    cart: Vec<CartLine>,
    products: Vec<Product>,
    session_valid: bool,
    failures: HashMap<&'static str, Failure>,
    calls: HashMap<&'static str, usize>,
    next_line: u32,
    coupon_percent: Option<u32>,
    orders: Vec<OrderPayload>,
    drafts: Vec<ProductDraft>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
    validate_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.state.lock().unwrap().products = products;
        self
    }

    pub fn set_session_valid(&self, valid: bool) {
        self.state.lock().unwrap().session_valid = valid;
    }

    pub fn fail(&self, op: &'static str, failure: Failure) {
        self.state.lock().unwrap().failures.insert(op, failure);
    }

    pub fn succeed(&self, op: &'static str) {
        self.state.lock().unwrap().failures.remove(op);
    }

    /// Make `validate_session` wait until the returned handle is notified.
    pub fn hold_validation(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.validate_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self, op: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(op)
            .copied()
            .unwrap_or_default()
    }

    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.state.lock().unwrap().cart.clone()
    }

    pub fn orders(&self) -> Vec<OrderPayload> {
        self.state.lock().unwrap().orders.clone()
    }

    pub fn drafts(&self) -> Vec<ProductDraft> {
        self.state.lock().unwrap().drafts.clone()
    }

    /// Seed the server cart with `qty` units of a product.
    pub fn seed_line(&self, product: &Product, qty: u32) -> CartItemId {
        let mut state = self.state.lock().unwrap();
        push_line(&mut state, product, qty)
    }

    /// Apply a coupon: every line's final total becomes `percent`% of its total.
    pub fn apply_coupon(&self, percent: u32) {
        self.state.lock().unwrap().coupon_percent = Some(percent);
    }

    /// Count the call and return the configured failure, if any.
    fn enter(&self, op: &'static str) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(op).or_default() += 1;
        state.failures.get(op).map_or(Ok(()), |f| Err(f.to_error()))
    }
}

fn push_line(state: &mut FakeState, product: &Product, qty: u32) -> CartItemId {
    state.next_line += 1;
    let id = CartItemId::new(format!("line-{}", state.next_line));
    let total = line_total(product.price, qty);
    state.cart.push(CartLine {
        id: id.clone(),
        product: CartProduct {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            unit: product.unit.clone(),
            image_url: product.image_url.clone(),
        },
        qty,
        total,
        final_total: total,
    });
    id
}

fn line_total(price: Money, qty: u32) -> Money {
    Money::new(price.amount() * rust_decimal::Decimal::from(qty))
}

fn cart_of(state: &FakeState) -> Cart {
    let mut lines = state.cart.clone();
    if let Some(percent) = state.coupon_percent {
        for line in &mut lines {
            line.final_total = Money::new(
                line.total.amount() * rust_decimal::Decimal::from(percent)
                    / rust_decimal::Decimal::ONE_HUNDRED,
            );
        }
    }
    let total = lines.iter().fold(Money::ZERO, |sum, line| sum + line.total);
    let final_total = lines
        .iter()
        .fold(Money::ZERO, |sum, line| sum + line.final_total);
    Cart {
        lines,
        total,
        final_total,
    }
}

fn page_of(products: Vec<Product>) -> ProductPage {
    ProductPage {
        products,
        pagination: Pagination::default(),
    }
}

pub fn product(id: &str, title: &str, price: i64) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        category: "toys".to_string(),
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

impl ShopBackend for FakeBackend {
    async fn validate_session(&self) -> Result<(), ApiError> {
        let gate = self.validate_gate.lock().unwrap().clone();
        self.enter("validate_session")?;
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.state.lock().unwrap().session_valid {
            Ok(())
        } else {
            Err(ApiError::Unauthorized("invalid token".to_string()))
        }
    }

    async fn login(&self, username: &Email, password: &SecretString) -> Result<Credential, ApiError> {
        self.enter("login")?;
        if password.expose_secret() != VALID_PASSWORD {
            return Err(ApiError::Rejected {
                status: 400,
                message: "Login failed".to_string(),
            });
        }
        self.set_session_valid(true);
        let expires = chrono::Utc::now() + chrono::Duration::days(1);
        Ok(Credential::new(format!("token-for-{}", username.as_str()), expires))
    }

    async fn get_cart(&self) -> Result<Cart, ApiError> {
        self.enter("get_cart")?;
        Ok(cart_of(&self.state.lock().unwrap()))
    }

    async fn add_cart_item(&self, intent: &CartIntent) -> Result<(), ApiError> {
        self.enter("add_cart_item")?;
        let mut state = self.state.lock().unwrap();
        if let Some(line) = state
            .cart
            .iter_mut()
            .find(|line| line.product.id == intent.product_id)
        {
            line.qty += intent.qty;
            line.total = line_total(line.product.price, line.qty);
            line.final_total = line.total;
            return Ok(());
        }
        let found = state
            .products
            .iter()
            .find(|p| p.id == intent.product_id)
            .cloned()
            .unwrap_or_else(|| product(intent.product_id.as_str(), "Mystery item", 100));
        push_line(&mut state, &found, intent.qty);
        Ok(())
    }

    async fn update_cart_item(&self, id: &CartItemId, intent: &CartIntent) -> Result<(), ApiError> {
        self.enter("update_cart_item")?;
        let mut state = self.state.lock().unwrap();
        let line = state
            .cart
            .iter_mut()
            .find(|line| &line.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        line.qty = intent.qty;
        line.total = line_total(line.product.price, line.qty);
        line.final_total = line.total;
        Ok(())
    }

    async fn remove_cart_item(&self, id: &CartItemId) -> Result<(), ApiError> {
        self.enter("remove_cart_item")?;
        self.state.lock().unwrap().cart.retain(|line| &line.id != id);
        Ok(())
    }

    async fn checkout(&self, order: &OrderPayload) -> Result<OrderReceipt, ApiError> {
        self.enter("checkout")?;
        let mut state = self.state.lock().unwrap();
        let total = cart_of(&state).final_total;
        state.cart.clear();
        state.orders.push(order.clone());
        Ok(OrderReceipt {
            order_id: OrderId::new(format!("order-{}", state.orders.len())),
            total,
            create_at: 1_700_000_000,
        })
    }

    async fn list_products(&self, category: Option<&str>, _page: u32) -> Result<ProductPage, ApiError> {
        self.enter("list_products")?;
        let products = self
            .state
            .lock()
            .unwrap()
            .products
            .iter()
            .filter(|p| p.is_enabled.is_enabled())
            .filter(|p| category.is_none_or(|c| p.category == c))
            .cloned()
            .collect();
        Ok(page_of(products))
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.enter("get_product")?;
        self.state
            .lock()
            .unwrap()
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))
    }

    async fn admin_list_products(&self, _page: u32) -> Result<ProductPage, ApiError> {
        self.enter("admin_list_products")?;
        Ok(page_of(self.state.lock().unwrap().products.clone()))
    }

    async fn admin_create_product(&self, draft: &ProductDraft) -> Result<(), ApiError> {
        self.enter("admin_create_product")?;
        self.state.lock().unwrap().drafts.push(draft.clone());
        Ok(())
    }

    async fn admin_update_product(&self, _id: &ProductId, draft: &ProductDraft) -> Result<(), ApiError> {
        self.enter("admin_update_product")?;
        self.state.lock().unwrap().drafts.push(draft.clone());
        Ok(())
    }

    async fn admin_delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        self.enter("admin_delete_product")?;
        self.state.lock().unwrap().products.retain(|p| &p.id != id);
        Ok(())
    }
}
