//! Navigation guard.
//!
//! Runs before every navigation: resolves an unknown session when the target
//! is protected, then permits the target or redirects to the login page or
//! the default dashboard.

use tracing::{debug, warn};

use crate::{
    routes::Route,
    stores::{Session, SessionSource},
};

const MAX_REDIRECTS: usize = 4;

/// Outcome of guarding one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The target may be shown.
    Proceed,
    /// Go to this route instead.
    Redirect(Route),
}

/// Access decision for `target` given an already resolved `session`.
#[must_use]
pub fn decide(target: &Route, session: &Session) -> GuardDecision {
    if target.requires_auth() && !session.is_authenticated {
        GuardDecision::Redirect(Route::Login)
    } else if target.requires_admin() && !session.is_admin {
        GuardDecision::Redirect(Route::Dashboard)
    } else {
        GuardDecision::Proceed
    }
}

/// Guard one navigation, resolving the session first when no user is loaded
/// and the target is protected.
pub async fn before_each<P>(source: &P, target: &Route) -> GuardDecision
where
    P: SessionSource + ?Sized,
{
    if !source.session().is_known() && target.requires_auth() {
        debug!(target = %target, "session unknown; checking authentication");
        source.check_auth().await;
    }
    decide(target, &source.session())
}

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Route asked for.
    pub requested: Route,
    /// Route shown after following redirects.
    pub landed: Route,
}

impl Navigation {
    /// Whether the guard sent the navigation elsewhere.
    #[must_use]
    pub fn redirected(&self) -> bool {
        self.requested != self.landed
    }
}

/// Follows navigations and their redirects through the guard.
#[derive(Debug)]
pub struct Navigator<P> {
    source: P,
    current: Option<Route>,
}

impl<P: SessionSource> Navigator<P> {
    /// Navigator that has not been anywhere yet.
    #[must_use]
    pub fn new(source: P) -> Self {
        Self {
            source,
            current: None,
        }
    }

    /// The route of the last completed navigation.
    #[must_use]
    pub fn current(&self) -> Option<&Route> {
        self.current.as_ref()
    }

    /// Session the guard consults.
    #[must_use]
    pub fn source(&self) -> &P {
        &self.source
    }

    /// Navigate to `target`, following redirects; each redirect is itself a
    /// guarded navigation.
    pub async fn navigate(&mut self, target: Route) -> Navigation {
        let requested = target.clone();
        let mut next = target;

        for _ in 0..MAX_REDIRECTS {
            match before_each(&self.source, &next).await {
                GuardDecision::Proceed => {
                    self.current = Some(next.clone());
                    return Navigation {
                        requested,
                        landed: next,
                    };
                }
                GuardDecision::Redirect(to) => {
                    debug!(from = %next, to = %to, "navigation redirected");
                    next = to;
                }
            }
        }

        warn!(requested = %requested, last = %next, "too many redirects; stopping");
        self.current = Some(next.clone());
        Navigation {
            requested,
            landed: next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Map;
    use shared::models::{User, UserType};
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };
    use strum::IntoEnumIterator;

    /// Session source whose backend answers with a fixed user, or no user.
    struct FakeSource {
        session: Mutex<Session>,
        backend_user: Option<User>,
        checks: AtomicUsize,
    }

    impl FakeSource {
        fn new(backend_user: Option<User>) -> Self {
            Self {
                session: Mutex::new(Session::default()),
                backend_user,
                checks: AtomicUsize::new(0),
            }
        }

        fn checks(&self) -> usize {
            self.checks.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionSource for FakeSource {
        fn session(&self) -> Session {
            self.session.lock().unwrap().clone()
        }

        async fn check_auth(&self) {
            self.checks.fetch_add(1, Ordering::SeqCst);
            let resolved = self
                .backend_user
                .clone()
                .map(Session::signed_in)
                .unwrap_or_default();
            *self.session.lock().unwrap() = resolved;
        }
    }

    fn user(user_type: UserType) -> User {
        User {
            id: 5,
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            user_type,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_unauthenticated_protected_routes_go_to_login() {
        let session = Session::default();
        for route in Route::iter().filter(Route::requires_auth) {
            assert_eq!(
                decide(&route, &session),
                GuardDecision::Redirect(Route::Login),
                "{route:?}"
            );
        }
    }

    #[test]
    fn test_public_routes_always_proceed() {
        let session = Session::default();
        for route in Route::iter().filter(Route::is_public) {
            assert_eq!(decide(&route, &session), GuardDecision::Proceed);
        }
    }

    #[test]
    fn test_non_admin_is_sent_to_dashboard() {
        for user_type in [UserType::Supervisor, UserType::Technician, UserType::Customer] {
            let session = Session::signed_in(user(user_type));
            assert_eq!(
                decide(&Route::Admin, &session),
                GuardDecision::Redirect(Route::Dashboard)
            );
            assert_eq!(decide(&Route::Dashboard, &session), GuardDecision::Proceed);
        }
    }

    #[test]
    fn test_admin_reaches_everything() {
        let session = Session::signed_in(user(UserType::Administrator));
        for route in Route::iter() {
            assert_eq!(decide(&route, &session), GuardDecision::Proceed, "{route:?}");
        }
    }

    #[tokio::test]
    async fn test_public_target_skips_auth_check() {
        let source = FakeSource::new(Some(user(UserType::Customer)));
        assert_eq!(before_each(&source, &Route::Login).await, GuardDecision::Proceed);
        assert_eq!(source.checks(), 0);
    }

    #[tokio::test]
    async fn test_unknown_session_is_resolved_once() {
        let source = FakeSource::new(Some(user(UserType::Technician)));
        assert_eq!(
            before_each(&source, &Route::DashboardTechnician).await,
            GuardDecision::Proceed
        );
        assert_eq!(
            before_each(&source, &Route::Dashboard).await,
            GuardDecision::Proceed
        );
        assert_eq!(source.checks(), 1);
    }

    #[tokio::test]
    async fn test_failed_resolution_redirects_to_login() {
        let source = FakeSource::new(None);
        assert_eq!(
            before_each(&source, &Route::TicketDetail { id: 3 }).await,
            GuardDecision::Redirect(Route::Login)
        );
        assert!(!source.session().is_authenticated);
    }

    #[tokio::test]
    async fn test_navigator_follows_redirects() {
        let mut navigator = Navigator::new(FakeSource::new(Some(user(UserType::Supervisor))));

        let landed = navigator.navigate(Route::Admin).await;
        assert_eq!(landed.landed, Route::Dashboard);
        assert!(landed.redirected());

        let landed = navigator.navigate(Route::DashboardSupervisor).await;
        assert!(!landed.redirected());
        assert_eq!(navigator.current(), Some(&Route::DashboardSupervisor));
    }

    #[tokio::test]
    async fn test_navigator_anonymous_lands_on_login() {
        let mut navigator = Navigator::new(FakeSource::new(None));
        let landed = navigator.navigate(Route::Admin).await;
        assert_eq!(landed.landed, Route::Login);
        assert_eq!(landed.requested, Route::Admin);
    }
}
