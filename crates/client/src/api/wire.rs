//! Wire formats of the backend's JSON envelopes.
//!
//! Every response carries `success` and usually `message`; the payload sits
//! beside them at the top level. Request bodies (except sign-in) are wrapped
//! as `{"data": ...}`.

use pawshop_core::{Cart, Pagination, Product};
use serde::{Deserialize, Serialize};

/// `message` is a string on most endpoints and a list of strings on admin
/// validation failures.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Message {
    One(String),
    Many(Vec<String>),
}

impl Message {
    pub fn joined(self) -> String {
        match self {
            Self::One(message) => message,
            Self::Many(messages) => messages.join(" "),
        }
    }
}

/// Response envelope around a payload `T`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(flatten)]
    pub body: T,
}

const fn default_success() -> bool {
    true
}

/// Envelope fields only, for reading error bodies and bodiless replies.
#[derive(Debug, Default, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<Message>,
}

/// Request wrapper: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SignInBody {
    pub token: String,
    /// Expiry in Unix milliseconds.
    pub expired: i64,
}

#[derive(Debug, Deserialize)]
pub struct Empty {}

#[derive(Debug, Deserialize)]
pub struct CartBody {
    #[serde(default)]
    pub data: Cart,
}

#[derive(Debug, Deserialize)]
pub struct ProductsBody {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct ProductBody {
    pub product: Option<Product>,
}
