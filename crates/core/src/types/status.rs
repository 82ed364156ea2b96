//! Status enums for products and admin sessions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Whether a product is listed in the storefront.
///
/// The backend encodes this as the integer flag `is_enabled` (`1` / `0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProductStatus {
    /// Listed and purchasable.
    Enabled,
    /// Hidden from the storefront.
    #[default]
    Disabled,
}

impl ProductStatus {
    /// Whether the product is enabled.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }

    /// Human-readable label for admin listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

impl From<bool> for ProductStatus {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Enabled } else { Self::Disabled }
    }
}

impl Serialize for ProductStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(self.is_enabled()))
    }
}

impl<'de> Deserialize<'de> for ProductStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accepts 0/1 as well as booleans; anything non-zero counts as enabled.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flag {
            Bool(bool),
            Int(i64),
        }

        Ok(match Flag::deserialize(deserializer)? {
            Flag::Bool(enabled) => Self::from(enabled),
            Flag::Int(flag) => Self::from(flag != 0),
        })
    }
}

/// What the session guard currently knows about the admin session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No guarded activation is in progress.
    #[default]
    Unknown,
    /// A guarded activation is waiting on the server.
    Checking,
    /// The server accepted the credential (or the caller vouched for it).
    Authenticated,
    /// No credential, or the server rejected it.
    Unauthenticated,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_status_wire_format() {
        assert_eq!(serde_json::to_string(&ProductStatus::Enabled).unwrap(), "1");
        assert_eq!(serde_json::to_string(&ProductStatus::Disabled).unwrap(), "0");

        let status: ProductStatus = serde_json::from_str("1").unwrap();
        assert_eq!(status, ProductStatus::Enabled);
        let status: ProductStatus = serde_json::from_str("false").unwrap();
        assert_eq!(status, ProductStatus::Disabled);
    }

    #[test]
    fn test_session_state_default() {
        assert_eq!(SessionState::default(), SessionState::Unknown);
    }
}
