//! Admin sign-in and sign-out.

use std::sync::Arc;

use pawshop_core::{Email, NavigationState, Redirect, Route};
use secrecy::SecretString;
use tracing::{info, instrument};

use crate::api::ShopBackend;
use crate::credential::CredentialStore;
use crate::error::{ClientError, Result, add_breadcrumb};
use crate::notice::Notices;

/// Authentication service.
pub struct Auth<B> {
    backend: Arc<B>,
    credentials: CredentialStore,
    notices: Notices,
}

impl<B> Clone for Auth<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            credentials: self.credentials.clone(),
            notices: self.notices.clone(),
        }
    }
}

impl<B: ShopBackend> Auth<B> {
    #[must_use]
    pub const fn new(backend: Arc<B>, credentials: CredentialStore, notices: Notices) -> Self {
        Self {
            backend,
            credentials,
            notices,
        }
    }

    /// Sign in and store the credential.
    ///
    /// On success, returns the replace-redirect to the admin landing page.
    /// It carries the skip flag, since the session was just validated.
    ///
    /// # Errors
    ///
    /// Returns the sign-in error after posting the server's message (or
    /// "Unknown error") as an error notice.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &Email, password: &SecretString) -> Result<Redirect> {
        add_breadcrumb("auth", "Login", None);

        let credential = match self.backend.login(username, password).await {
            Ok(credential) => credential,
            Err(e) => {
                let err = ClientError::Request(e);
                err.report();
                self.notices.error(err.user_message("Unknown error"));
                return Err(err);
            }
        };

        info!(expires_at = %credential.expires_at(), "Login succeeded");
        self.credentials.set(credential)?;
        self.notices.success("Login succeeded");

        Ok(Redirect::replace(Route::AdminProducts).with_state(NavigationState::vouched()))
    }

    /// Forget the credential and return the redirect to the login page.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted credential cannot be removed.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<Redirect> {
        add_breadcrumb("auth", "Logout", None);
        self.credentials.clear()?;
        info!("Logged out");
        Ok(Redirect::replace(Route::Login))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notice::{NoticeLevel, drain};
    use crate::testing::{FakeBackend, VALID_PASSWORD};

    fn auth(backend: &Arc<FakeBackend>) -> (Auth<FakeBackend>, CredentialStore, Notices) {
        let credentials = CredentialStore::in_memory("pawshopToken");
        let notices = Notices::new();
        (
            Auth::new(Arc::clone(backend), credentials.clone(), notices.clone()),
            credentials,
            notices,
        )
    }

    fn admin() -> Email {
        Email::parse("admin@pawshop.test").unwrap()
    }

    #[tokio::test]
    async fn test_login_stores_credential_and_vouches() {
        let backend = FakeBackend::shared();
        let (auth, credentials, notices) = auth(&backend);
        let mut received = notices.subscribe();

        let redirect = auth
            .login(&admin(), &SecretString::from(VALID_PASSWORD))
            .await
            .unwrap();

        assert_eq!(redirect.to, Route::AdminProducts);
        assert!(redirect.replace);
        assert!(redirect.state.skip_auth_check);
        assert!(credentials.get().is_some());
        assert_eq!(drain(&mut received)[0].message, "Login succeeded");
    }

    #[tokio::test]
    async fn test_login_failure_shows_server_message() {
        let backend = FakeBackend::shared();
        let (auth, credentials, notices) = auth(&backend);
        let mut received = notices.subscribe();

        let result = auth.login(&admin(), &SecretString::from("wrong")).await;

        assert!(matches!(result, Err(ClientError::Request(_))));
        assert!(credentials.get().is_none());
        let notice = drain(&mut received).pop().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Login failed");
    }

    #[tokio::test]
    async fn test_logout_clears_credential() {
        let backend = FakeBackend::shared();
        let (auth, credentials, _) = auth(&backend);
        auth.login(&admin(), &SecretString::from(VALID_PASSWORD))
            .await
            .unwrap();

        let redirect = auth.logout().unwrap();

        assert_eq!(redirect, Redirect::replace(Route::Login));
        assert!(credentials.get().is_none());
    }
}
