//! Session guard for admin-only and login-only routes.
//!
//! Every navigation into a guarded route starts a fresh [`Activation`]. The
//! guard resolves it to either rendering the route or replace-redirecting
//! elsewhere:
//!
//! | Category | No credential | Skip flag | Server accepts | Server rejects |
//! |----------|---------------|-----------|----------------|----------------|
//! | `Admin`  | → `/login`    | render    | render         | → `/login`     |
//! | `Login`  | render        | (ignored) | → `/admin/product` | render     |
//!
//! Activations are numbered. Only the latest one may publish an outcome;
//! a validation that settles after its activation was torn down or
//! superseded is dropped without touching state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use pawshop_core::{NavigationState, Redirect, Route, RouteCategory, SessionState};
use tokio::sync::watch;
use tracing::{debug, instrument};

use crate::api::ShopBackend;
use crate::credential::CredentialStore;

/// What the guard is currently doing, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GuardState {
    /// No guarded route is active.
    #[default]
    Idle,
    /// Waiting for the session check; show a loading indicator.
    Checking,
    /// The route may render.
    Allowed,
    /// The route was left for another one.
    Redirected(Route),
}

/// What to do with the guarded route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Render the route.
    Render,
    /// Navigate elsewhere instead.
    Redirect(Redirect),
}

/// The single result of an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardDecision {
    /// What the guard learned about the session.
    pub session: SessionState,
    /// What the router should do.
    pub outcome: GuardOutcome,
}

impl GuardDecision {
    const fn render(session: SessionState) -> Self {
        Self {
            session,
            outcome: GuardOutcome::Render,
        }
    }

    const fn redirect(session: SessionState, to: Route) -> Self {
        Self {
            session,
            outcome: GuardOutcome::Redirect(Redirect::replace(to)),
        }
    }
}

/// Handle to one guarded navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    generation: u64,
    category: RouteCategory,
}

impl Activation {
    /// Category of the route being guarded.
    #[must_use]
    pub const fn category(&self) -> RouteCategory {
        self.category
    }
}

/// Gates admin and login routes on the admin session.
///
/// Cheap to clone; clones share activations and published state.
pub struct SessionGuard<B> {
    inner: Arc<SessionGuardInner<B>>,
}

impl<B> Clone for SessionGuard<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SessionGuardInner<B> {
    backend: Arc<B>,
    credentials: CredentialStore,
    generation: AtomicU64,
    state: watch::Sender<GuardState>,
}

impl<B: ShopBackend> SessionGuard<B> {
    /// Create a guard reading credentials from `credentials`.
    #[must_use]
    pub fn new(backend: Arc<B>, credentials: CredentialStore) -> Self {
        let (state, _) = watch::channel(GuardState::Idle);
        Self {
            inner: Arc::new(SessionGuardInner {
                backend,
                credentials,
                generation: AtomicU64::new(0),
                state,
            }),
        }
    }

    /// Subscribe to guard state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GuardState> {
        self.inner.state.subscribe()
    }

    /// The currently published state.
    #[must_use]
    pub fn state(&self) -> GuardState {
        self.inner.state.borrow().clone()
    }

    /// Start guarding a route of `category`, superseding any earlier activation.
    pub fn activate(&self, category: RouteCategory) -> Activation {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_replace(GuardState::Checking);
        debug!(generation, ?category, "Guard activated");
        Activation {
            generation,
            category,
        }
    }

    /// Whether `activation` is still the latest one.
    #[must_use]
    pub fn is_current(&self, activation: &Activation) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == activation.generation
    }

    /// Leave the guarded route. Any pending result for `activation` is dropped.
    ///
    /// Returns `false` if a newer activation had already taken over, in which
    /// case nothing changes.
    pub fn teardown(&self, activation: &Activation) -> bool {
        let torn_down = self
            .inner
            .generation
            .compare_exchange(
                activation.generation,
                activation.generation + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();
        if torn_down {
            self.inner.state.send_replace(GuardState::Idle);
            debug!(generation = activation.generation, "Guard torn down");
        }
        torn_down
    }

    /// Activate and resolve in one step.
    pub async fn check(
        &self,
        category: RouteCategory,
        navigation: NavigationState,
    ) -> Option<GuardDecision> {
        let activation = self.activate(category);
        self.resolve(&activation, navigation).await
    }

    /// Decide the outcome of `activation`.
    ///
    /// Issues at most one session validation call. Returns `None` when the
    /// activation was torn down or superseded before the decision was
    /// reached; the published state is then left alone.
    #[instrument(skip(self, activation), fields(generation = activation.generation, category = ?activation.category))]
    pub async fn resolve(
        &self,
        activation: &Activation,
        navigation: NavigationState,
    ) -> Option<GuardDecision> {
        let decision = self.decide(activation, navigation).await?;
        self.publish(activation, decision)
    }

    async fn decide(
        &self,
        activation: &Activation,
        navigation: NavigationState,
    ) -> Option<GuardDecision> {
        let category = activation.category;
        if !category.is_guarded() {
            return Some(GuardDecision::render(SessionState::Unknown));
        }

        if self.inner.credentials.get().is_none() {
            debug!("No credential");
            return Some(match category {
                RouteCategory::Admin => {
                    GuardDecision::redirect(SessionState::Unauthenticated, Route::Login)
                }
                _ => GuardDecision::render(SessionState::Unauthenticated),
            });
        }

        // Only the admin guard trusts the post-login flag
        if category == RouteCategory::Admin && navigation.skip_auth_check {
            debug!("Session vouched for by caller, skipping check");
            return Some(GuardDecision::render(SessionState::Authenticated));
        }

        if !self.is_current(activation) {
            return None;
        }

        let valid = match self.inner.backend.validate_session().await {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Session validation failed");
                false
            }
        };

        Some(match (category, valid) {
            (RouteCategory::Login, true) => {
                GuardDecision::redirect(SessionState::Authenticated, Route::AdminProducts)
            }
            (RouteCategory::Login, false) => GuardDecision::render(SessionState::Unauthenticated),
            (_, true) => GuardDecision::render(SessionState::Authenticated),
            (_, false) => GuardDecision::redirect(SessionState::Unauthenticated, Route::Login),
        })
    }

    /// Publish `decision` if `activation` is still current.
    fn publish(&self, activation: &Activation, decision: GuardDecision) -> Option<GuardDecision> {
        let next = match &decision.outcome {
            GuardOutcome::Render => GuardState::Allowed,
            GuardOutcome::Redirect(redirect) => GuardState::Redirected(redirect.to.clone()),
        };

        // The generation is re-read under the channel lock, so a teardown
        // racing with this publish always lands after it.
        let applied = self.inner.state.send_if_modified(|state| {
            if self.is_current(activation) {
                *state = next;
                true
            } else {
                false
            }
        });

        if applied {
            debug!(outcome = ?decision.outcome, session = ?decision.session, "Guard resolved");
            Some(decision)
        } else {
            debug!("Discarding stale guard result");
            None
        }
    }
}
