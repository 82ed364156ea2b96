//! Unified error handling with Sentry integration.
//!
//! Every user-triggered operation returns `Result<T, ClientError>`. The
//! variants follow how the failure is handled:
//!
//! - `AuthFailure` only ever chooses a route; it is never shown as an error
//! - `Validation` is reported against form fields before anything is sent
//! - `Request` becomes a transient notice; the operation is abandoned
//! - `NotFound` renders a placeholder

use pawshop_core::{Redirect, Route, ValidationErrors};
use thiserror::Error;

use crate::api::ApiError;
use crate::credential::CredentialError;

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing, expired or rejected admin credential.
    #[error("Not authenticated")]
    AuthFailure,

    /// Form input rejected before submission.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Network or server failure.
    #[error("Request failed: {0}")]
    Request(ApiError),

    /// The referenced product or route does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The credential could not be saved or removed.
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized(_) => Self::AuthFailure,
            ApiError::NotFound(what) => Self::NotFound(what),
            other => Self::Request(other),
        }
    }
}

impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl ClientError {
    /// Whether the failure should be surfaced as an error notice.
    #[must_use]
    pub const fn is_user_visible(&self) -> bool {
        !matches!(self, Self::AuthFailure)
    }

    /// Where to send the user instead of reporting the failure.
    ///
    /// An auth failure during an admin action means the session lapsed, so
    /// the user goes back to the login page.
    #[must_use]
    pub const fn redirect(&self) -> Option<Redirect> {
        match self {
            Self::AuthFailure => Some(Redirect::replace(Route::Login)),
            _ => None,
        }
    }

    /// Text safe to show the user.
    ///
    /// Backend refusals keep the backend's own message; transport details
    /// are hidden behind `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Request(err) => err
                .server_message()
                .map_or_else(|| fallback.to_string(), str::to_string),
            Self::Validation(errors) => errors
                .errors()
                .first()
                .map_or_else(|| fallback.to_string(), |e| e.message.clone()),
            Self::NotFound(_) => "Not found".to_string(),
            Self::AuthFailure => "Please sign in again".to_string(),
            Self::Credential(_) => fallback.to_string(),
        }
    }

    /// Capture server-side failures to Sentry and log them.
    ///
    /// Validation, auth and not-found outcomes are expected and only logged
    /// at debug level.
    pub fn report(&self) {
        if matches!(self, Self::Request(_) | Self::Credential(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Handled client error");
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "p-1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
