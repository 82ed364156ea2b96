//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PAWSHOP_API_BASE_URL` - Backend base URL (e.g. `https://api.example.com`)
//! - `PAWSHOP_API_PATH` - Shop path segment used in `/api/{path}/...` endpoints
//!
//! ## Optional
//! - `PAWSHOP_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `PAWSHOP_COOKIE_NAME` - Name the admin token is stored under (default: `pawshopToken`)
//! - `PAWSHOP_CREDENTIAL_FILE` - File the admin token cookie persists to
//! - `PAWSHOP_FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is free (default: 2000)
//! - `PAWSHOP_SHIPPING_FEE` - Flat shipping fee below the threshold (default: 120)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use pawshop_core::{Money, ShippingPolicy};
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_COOKIE_NAME: &str = "pawshopToken";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL
    pub api_base_url: Url,
    /// Shop path segment for `/api/{path}/...` endpoints
    pub api_path: String,
    /// Transport-level request timeout
    pub request_timeout: Duration,
    /// Cookie name the admin token is stored under
    pub cookie_name: String,
    /// File the credential cookie persists to (in-memory only when unset)
    pub credential_file: Option<PathBuf>,
    /// Shipping display rule
    pub shipping: ShippingPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(&get_required_env("PAWSHOP_API_BASE_URL")?)?;
        let api_path = get_required_env("PAWSHOP_API_PATH")?;
        validate_api_path(&api_path)?;

        let timeout_secs = parse_env_or_default::<u64>(
            "PAWSHOP_REQUEST_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PAWSHOP_REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let defaults = ShippingPolicy::default();
        let shipping = ShippingPolicy {
            free_threshold: parse_money_or_default(
                "PAWSHOP_FREE_SHIPPING_THRESHOLD",
                defaults.free_threshold,
            )?,
            flat_fee: parse_money_or_default("PAWSHOP_SHIPPING_FEE", defaults.flat_fee)?,
        };

        Ok(Self {
            api_base_url,
            api_path,
            request_timeout: Duration::from_secs(timeout_secs),
            cookie_name: get_env_or_default("PAWSHOP_COOKIE_NAME", DEFAULT_COOKIE_NAME),
            credential_file: get_optional_env("PAWSHOP_CREDENTIAL_FILE").map(PathBuf::from),
            shipping,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }

    /// Configuration pointing at `base_url` with every optional setting at
    /// its default. Used by tests and embedders that do not read the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` or `api_path` is invalid.
    pub fn new(base_url: &str, api_path: &str) -> Result<Self, ConfigError> {
        validate_api_path(api_path)?;
        Ok(Self {
            api_base_url: parse_base_url(base_url)?,
            api_path: api_path.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cookie_name: DEFAULT_COOKIE_NAME.to_owned(),
            credential_file: None,
            shipping: ShippingPolicy::default(),
            sentry_dsn: None,
        })
    }

    /// Full URL for a backend endpoint path such as `/admin/signin`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.api_base_url.as_str().trim_end_matches('/'),
            path
        )
    }

    /// Full URL for a shop-scoped endpoint, `/api/{api_path}{path}`.
    #[must_use]
    pub fn shop_endpoint(&self, path: &str) -> String {
        self.endpoint(&format!("/api/{}{}", self.api_path, path))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional environment variable, falling back to `default`.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

fn parse_money_or_default(key: &str, default: Money) -> Result<Money, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let dollars = raw
        .parse::<i64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if dollars < 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "cannot be negative".to_string(),
        ));
    }
    Ok(Money::from_dollars(dollars))
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| {
        ConfigError::InvalidEnvVar("PAWSHOP_API_BASE_URL".to_string(), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "PAWSHOP_API_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

fn validate_api_path(path: &str) -> Result<(), ConfigError> {
    if path.is_empty() || path.contains('/') || path.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidEnvVar(
            "PAWSHOP_API_PATH".to_string(),
            "must be a single non-empty path segment".to_string(),
        ));
    }
    Ok(())
}
