//! Monetary amounts and the shipping display rule.
//!
//! All prices are in New Taiwan dollars. The backend owns every total; the
//! only amount the client derives is the shipping line shown next to the
//! subtotal.

use core::fmt;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money in NT$.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from whole dollars.
    #[must_use]
    pub fn from_dollars(dollars: i64) -> Self {
        Self(Decimal::from(dollars))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NT${}", self.0.normalize())
    }
}

/// Shipping charge shown in cart and checkout summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "fee", rename_all = "snake_case")]
pub enum Shipping {
    /// No shipping fee.
    Free,
    /// Flat shipping fee.
    Flat(Money),
    /// The cart has not been loaded (or failed to load), so the fee is unknown.
    Unknown,
}

impl fmt::Display for Shipping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => f.write_str("Free shipping"),
            Self::Flat(fee) => write!(f, "{fee}"),
            Self::Unknown => f.write_str("--"),
        }
    }
}

/// Rule deciding the shipping line from a server-reported subtotal.
///
/// Orders above `free_threshold` ship free, as does an empty cart whose
/// subtotal is zero. Everything else pays `flat_fee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Subtotals strictly above this amount ship free.
    pub free_threshold: Money,
    /// Fee charged below the threshold.
    pub flat_fee: Money,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_threshold: Money::from_dollars(2000),
            flat_fee: Money::from_dollars(120),
        }
    }
}

impl ShippingPolicy {
    /// Shipping for a loaded cart subtotal, or `Unknown` when no cart is loaded.
    #[must_use]
    pub fn quote(&self, subtotal: Option<Money>) -> Shipping {
        match subtotal {
            None => Shipping::Unknown,
            Some(subtotal) if subtotal.is_zero() || subtotal > self.free_threshold => {
                Shipping::Free
            }
            Some(_) => Shipping::Flat(self.flat_fee),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_dollars(120).to_string(), "NT$120");
        assert_eq!(Money::new(Decimal::new(12_350, 1)).to_string(), "NT$1235");
        assert_eq!(Money::new(Decimal::new(995, 1)).to_string(), "NT$99.5");
    }

    #[test]
    fn test_deserializes_json_numbers() {
        let money: Money = serde_json::from_str("1999").unwrap();
        assert_eq!(money, Money::from_dollars(1999));
        let money: Money = serde_json::from_str("99.5").unwrap();
        assert_eq!(money, Money::new(Decimal::new(995, 1)));
    }

    #[test]
    fn test_shipping_quote() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.quote(None), Shipping::Unknown);
        assert_eq!(policy.quote(Some(Money::ZERO)), Shipping::Free);
        assert_eq!(
            policy.quote(Some(Money::from_dollars(500))),
            Shipping::Flat(Money::from_dollars(120))
        );
        // The threshold itself still pays shipping
        assert_eq!(
            policy.quote(Some(Money::from_dollars(2000))),
            Shipping::Flat(Money::from_dollars(120))
        );
        assert_eq!(policy.quote(Some(Money::from_dollars(2001))), Shipping::Free);
    }

    #[test]
    fn test_is_negative() {
        assert!(Money::from_dollars(-1).is_negative());
        assert!(!Money::ZERO.is_negative());
    }
}
