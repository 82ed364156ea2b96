//! Admin bearer credential.
//!
//! The credential is an opaque token plus the moment it stops being
//! accepted. Holding one says nothing about whether the server still
//! honours it; only a successful session check does.

use core::fmt;

use chrono::{DateTime, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};

/// Opaque admin token with its expiry.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct Credential {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential from a token and its expiry.
    #[must_use]
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            expires_at,
        }
    }

    /// Create a credential whose expiry is given in Unix milliseconds,
    /// the format the sign-in endpoint reports.
    ///
    /// Returns `None` when the timestamp is out of range.
    #[must_use]
    pub fn from_unix_millis(token: impl Into<String>, expires_ms: i64) -> Option<Self> {
        let expires_at = Utc.timestamp_millis_opt(expires_ms).single()?;
        Some(Self::new(token, expires_at))
    }

    /// The raw token, for attaching to outgoing requests.
    #[must_use]
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// When the credential expires.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the credential is expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the credential is expired right now.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the token is non-empty.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_from_unix_millis() {
        let credential = Credential::from_unix_millis("tok", 1_700_000_000_000).unwrap();
        assert_eq!(credential.expires_at().timestamp(), 1_700_000_000);
        assert_eq!(credential.token().expose_secret(), "tok");
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let credential = Credential::new("tok", now + Duration::hours(1));
        assert!(!credential.is_expired_at(now));
        assert!(credential.is_expired_at(now + Duration::hours(1)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("super-secret-token", Utc::now());
        let debug = format!("{credential:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-token"));
    }

    #[test]
    fn test_has_token() {
        assert!(!Credential::new("", Utc::now()).has_token());
        assert!(Credential::new("x", Utc::now()).has_token());
    }
}
