//! Checkout form and the order payload posted to the backend.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::OrderId;
use super::money::Money;
use super::validation::ValidationErrors;

/// Minimum phone number length accepted at checkout.
pub const MIN_TEL_LENGTH: usize = 9;

/// Recipient details as typed into the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    /// Recipient name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub tel: String,
    /// Delivery address.
    pub address: String,
    /// Optional note to the shop.
    #[serde(default)]
    pub message: String,
}

impl CheckoutForm {
    /// Validate the form and build the order payload.
    ///
    /// # Errors
    ///
    /// Returns every rejected field: blank name, email, phone or address,
    /// a malformed email, or a phone number shorter than nine characters.
    pub fn into_payload(self) -> Result<OrderPayload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name, "Name is required");

        let email = if self.email.trim().is_empty() {
            errors.push("email", "Email is required");
            None
        } else {
            match Email::parse(self.email.trim()) {
                Ok(email) => Some(email),
                Err(_) => {
                    errors.push("email", "Email format is invalid");
                    None
                }
            }
        };

        if self.tel.trim().is_empty() {
            errors.push("tel", "Phone is required");
        } else if self.tel.trim().chars().count() < MIN_TEL_LENGTH {
            errors.push("tel", "Phone must be longer than 8 digits");
        }
        errors.require("address", &self.address, "Address is required");

        errors.into_result()?;
        let Some(email) = email else {
            return Err(ValidationErrors::new());
        };

        Ok(OrderPayload {
            user: OrderUser {
                name: self.name.trim().to_owned(),
                email,
                tel: self.tel.trim().to_owned(),
                address: self.address.trim().to_owned(),
            },
            message: self.message,
        })
    }
}

/// Order recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUser {
    /// Recipient name.
    pub name: String,
    /// Contact email.
    pub email: Email,
    /// Contact phone.
    pub tel: String,
    /// Delivery address.
    pub address: String,
}

/// Body of the checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    /// Recipient.
    pub user: OrderUser,
    /// Note to the shop.
    pub message: String,
}

/// What the backend reports after accepting an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Created order.
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
    /// Amount charged.
    #[serde(default)]
    pub total: Money,
    /// Creation time, Unix seconds.
    #[serde(default)]
    pub create_at: i64,
}
