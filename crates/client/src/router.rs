//! Client-side router and navigation history.
//!
//! Guarded routes go through the [`SessionGuard`] before they render.
//! Redirects always replace the current history entry, so the back button
//! never returns to a page that immediately redirects again.

use pawshop_core::{NavigationState, Redirect, Route};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::api::ShopBackend;
use crate::guard::{Activation, GuardOutcome, SessionGuard};

/// One history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub route: Route,
    pub state: NavigationState,
}

/// Browser-style history stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a new entry on top.
    pub fn push(&mut self, route: Route, state: NavigationState) {
        self.entries.push(HistoryEntry { route, state });
    }

    /// Overwrite the top entry (or add one if the stack is empty).
    pub fn replace(&mut self, route: Route, state: NavigationState) {
        let entry = HistoryEntry { route, state };
        match self.entries.last_mut() {
            Some(top) => *top = entry,
            None => self.entries.push(entry),
        }
    }

    /// Drop the top entry and return the one beneath it.
    ///
    /// The first entry is never dropped.
    pub fn back(&mut self) -> Option<&HistoryEntry> {
        if self.entries.len() < 2 {
            return None;
        }
        self.entries.pop();
        self.entries.last()
    }

    /// The top entry.
    #[must_use]
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

/// Result of a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// This route is now on screen.
    Rendered(Route),
    /// A newer navigation took over before this one settled.
    Superseded,
}

/// Router driving the session guard and history.
pub struct Router<B> {
    guard: SessionGuard<B>,
    history: History,
    active: Option<Activation>,
}

impl<B: ShopBackend> Router<B> {
    #[must_use]
    pub const fn new(guard: SessionGuard<B>) -> Self {
        Self {
            guard,
            history: History::new(),
            active: None,
        }
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Route currently on screen.
    #[must_use]
    pub fn current(&self) -> Option<&Route> {
        self.history.current().map(|entry| &entry.route)
    }

    /// Navigate to `path`, pushing a history entry.
    #[instrument(skip(self))]
    pub async fn navigate(&mut self, path: &str, state: NavigationState) -> Navigation {
        self.go(Route::parse(path), state, false).await
    }

    /// Perform a navigation returned by a service (login, logout, checkout).
    pub async fn follow(&mut self, redirect: Redirect) -> Navigation {
        self.go(redirect.to, redirect.state, redirect.replace).await
    }

    /// Go back one entry, re-running the guard for the route landed on.
    ///
    /// A vouch only covers the navigation that carried it, so replayed
    /// entries are always checked.
    pub async fn back(&mut self) -> Option<Navigation> {
        let entry = self.history.back()?.clone();
        let mut state = entry.state;
        state.skip_auth_check = false;
        Some(self.go(entry.route, state, true).await)
    }

    /// Leave the current guarded route, dropping any pending check.
    pub fn leave(&mut self) {
        if let Some(activation) = self.active.take() {
            self.guard.teardown(&activation);
        }
    }

    async fn go(&mut self, route: Route, state: NavigationState, replace: bool) -> Navigation {
        self.leave();
        self.record(route.clone(), state, replace);

        let Some(outcome) = self.guarded(&route, state).await else {
            return Navigation::Superseded;
        };
        let redirect = match outcome {
            GuardOutcome::Render => return Navigation::Rendered(route),
            GuardOutcome::Redirect(redirect) => redirect,
        };

        debug!(from = %route, to = %redirect.to, "Following guard redirect");
        self.record(redirect.to.clone(), redirect.state, true);
        match self.guarded(&redirect.to, redirect.state).await {
            None => Navigation::Superseded,
            Some(GuardOutcome::Render) => Navigation::Rendered(redirect.to),
            Some(GuardOutcome::Redirect(again)) => {
                // The session changed between two checks; stop on the login page
                debug!(to = %again.to, "Not following a second redirect");
                self.history.replace(Route::Login, NavigationState::default());
                Navigation::Rendered(Route::Login)
            }
        }
    }

    /// Run the guard for `route` if its category needs one.
    async fn guarded(&mut self, route: &Route, state: NavigationState) -> Option<GuardOutcome> {
        let category = route.category();
        if !category.is_guarded() {
            return Some(GuardOutcome::Render);
        }

        let activation = self.guard.activate(category);
        self.active = Some(activation);
        self.guard
            .resolve(&activation, state)
            .await
            .map(|decision| decision.outcome)
    }

    fn record(&mut self, route: Route, state: NavigationState, replace: bool) {
        if replace {
            self.history.replace(route, state);
        } else {
            self.history.push(route, state);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use pawshop_core::Credential;

    use super::*;
    use crate::credential::CredentialStore;
    use crate::guard::GuardState;
    use crate::testing::FakeBackend;

    fn router(backend: &Arc<FakeBackend>, credentials: CredentialStore) -> Router<FakeBackend> {
        Router::new(SessionGuard::new(Arc::clone(backend), credentials))
    }

    fn signed_in() -> CredentialStore {
        let store = CredentialStore::in_memory("pawshopToken");
        store
            .set(Credential::new("abc", Utc::now() + Duration::hours(1)))
            .unwrap();
        store
    }

    fn paths(router: &Router<FakeBackend>) -> Vec<String> {
        router
            .history()
            .entries()
            .iter()
            .map(|e| e.route.path())
            .collect()
    }

    #[test]
    fn test_history_push_replace_back() {
        let mut history = History::new();
        assert!(history.back().is_none());

        history.replace(Route::Home, NavigationState::default());
        history.push(Route::Products, NavigationState::default());
        history.replace(Route::Cart, NavigationState::default());
        assert_eq!(history.len(), 2);

        assert_eq!(history.back().unwrap().route, Route::Home);
        assert!(history.back().is_none());
        assert_eq!(history.current().unwrap().route, Route::Home);
    }

    #[tokio::test]
    async fn test_public_routes_render_without_guard() {
        let backend = FakeBackend::shared();
        let mut router = router(&backend, CredentialStore::in_memory("pawshopToken"));

        assert_eq!(
            router.navigate("/cart", NavigationState::default()).await,
            Navigation::Rendered(Route::Cart)
        );
        assert_eq!(router.guard.state(), GuardState::Idle);
        assert_eq!(backend.calls("validate_session"), 0);
    }

    #[tokio::test]
    async fn test_admin_without_cookie_lands_on_login() {
        let backend = FakeBackend::shared();
        let mut router = router(&backend, CredentialStore::in_memory("pawshopToken"));
        router.navigate("/", NavigationState::default()).await;

        let navigation = router
            .navigate("/admin/product", NavigationState::default())
            .await;

        assert_eq!(navigation, Navigation::Rendered(Route::Login));
        // The admin entry was replaced, not stacked under the login page
        assert_eq!(paths(&router), ["/", "/login"]);
        assert_eq!(backend.calls("validate_session"), 0);
    }

    #[tokio::test]
    async fn test_login_with_valid_token_lands_on_admin() {
        let backend = FakeBackend::shared();
        backend.set_session_valid(true);
        let mut router = router(&backend, signed_in());

        let navigation = router.navigate("/login", NavigationState::default()).await;

        assert_eq!(navigation, Navigation::Rendered(Route::AdminProducts));
        assert_eq!(paths(&router), ["/admin/product"]);
        assert_eq!(
            router.history().current().unwrap().state,
            NavigationState::default()
        );
    }

    #[tokio::test]
    async fn test_follow_vouched_redirect_skips_check() {
        let backend = FakeBackend::shared();
        let mut router = router(&backend, signed_in());
        router.navigate("/login", NavigationState::default()).await;
        let checks = backend.calls("validate_session");

        let redirect = Redirect::replace(Route::AdminProducts).with_state(NavigationState::vouched());
        assert_eq!(
            router.follow(redirect).await,
            Navigation::Rendered(Route::AdminProducts)
        );
        assert_eq!(backend.calls("validate_session"), checks);
        assert_eq!(paths(&router), ["/admin/product"]);
    }

    #[tokio::test]
    async fn test_back_to_vouched_entry_checks_again() {
        let backend = FakeBackend::shared();
        let mut router = router(&backend, signed_in());
        let redirect = Redirect::replace(Route::AdminProducts).with_state(NavigationState::vouched());
        router.follow(redirect).await;
        router.navigate("/products", NavigationState::default()).await;
        assert_eq!(backend.calls("validate_session"), 0);

        // The token has since been revoked; the login page checks it once more
        assert_eq!(router.back().await, Some(Navigation::Rendered(Route::Login)));
        assert_eq!(backend.calls("validate_session"), 2);
        assert_eq!(paths(&router), ["/login"]);
    }

    #[tokio::test]
    async fn test_leaving_admin_tears_down_guard() {
        let backend = FakeBackend::shared();
        backend.set_session_valid(true);
        let mut router = router(&backend, signed_in());
        router.navigate("/admin", NavigationState::default()).await;
        assert_eq!(router.guard.state(), GuardState::Allowed);

        router.navigate("/products", NavigationState::default()).await;
        assert_eq!(router.guard.state(), GuardState::Idle);

        assert_eq!(
            router.back().await,
            Some(Navigation::Rendered(Route::AdminProducts))
        );
        assert_eq!(backend.calls("validate_session"), 2);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let backend = FakeBackend::shared();
        let mut router = router(&backend, CredentialStore::in_memory("pawshopToken"));
        assert_eq!(
            router.navigate("/kennel", NavigationState::default()).await,
            Navigation::Rendered(Route::NotFound("/kennel".to_string()))
        );

        // Unknown admin paths are still guarded
        assert_eq!(
            router.navigate("/admin/orders", NavigationState::default()).await,
            Navigation::Rendered(Route::Login)
        );
    }
}
