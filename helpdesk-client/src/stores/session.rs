//! Session state and the login, registration and logout flows.

use async_trait::async_trait;
use shared::models::{Credentials, RegisterRequest, User, UserType};
use tracing::{debug, info};

use super::{StoreHandle, StoreState};
use crate::{error::ClientResult, routes::Route, services::AuthService};

/// Identity and role of the current user, rebuilt from the backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    /// The loaded user, if any.
    pub user: Option<User>,
    /// A user is loaded and signed in.
    pub is_authenticated: bool,
    /// The signed-in user is an administrator.
    pub is_admin: bool,
    /// A session action is in flight.
    pub loading: bool,
    /// Message of the last failed action.
    pub error: Option<String>,
}

impl Session {
    /// A session authenticated as `user`.
    #[must_use]
    pub fn signed_in(user: User) -> Self {
        let mut session = Self::default();
        session.sign_in(user);
        session
    }

    /// Whether a "who am I" call has loaded a user.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.user.is_some()
    }

    /// Role of the loaded user.
    #[must_use]
    pub fn user_type(&self) -> Option<&UserType> {
        self.user.as_ref().map(|user| &user.user_type)
    }

    /// Where to send the user after signing in.
    #[must_use]
    pub fn landing_route(&self) -> Route {
        if !self.is_authenticated {
            return Route::Login;
        }
        match self.user_type() {
            Some(UserType::Administrator) => Route::Admin,
            Some(UserType::Supervisor) => Route::DashboardSupervisor,
            Some(UserType::Technician) => Route::DashboardTechnician,
            Some(UserType::Customer | UserType::Unknown(_)) | None => Route::Dashboard,
        }
    }

    fn sign_in(&mut self, user: User) {
        self.is_admin = user.is_admin();
        self.is_authenticated = true;
        self.user = Some(user);
    }

    fn sign_out(&mut self) {
        self.user = None;
        self.is_authenticated = false;
        self.is_admin = false;
    }
}

impl StoreState for Session {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

/// What the route guard needs from a session: its current state and a way
/// to resolve it.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Current session state.
    fn session(&self) -> Session;

    /// Resolve the session from the backend. Failures demote the session to
    /// unauthenticated and are never surfaced.
    async fn check_auth(&self);
}

/// Owns the session state and the login/logout flows.
#[derive(Clone, Debug)]
pub struct SessionStore {
    auth: AuthService,
    handle: StoreHandle<Session>,
}

impl SessionStore {
    /// Store with an unknown session.
    #[must_use]
    pub fn new(auth: AuthService) -> Self {
        Self {
            auth,
            handle: StoreHandle::new(),
        }
    }

    /// Copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.handle.snapshot()
    }

    async fn resolve(&self) {
        let _loading = self.handle.begin();
        match self.auth.current_user().await {
            Ok(user) => {
                debug!(user_id = user.id, user_type = %user.user_type, "session resolved");
                self.handle.update(|session| session.sign_in(user));
            }
            Err(err) => {
                debug!(error = %err, "no active session");
                self.handle.update(Session::sign_out);
            }
        }
    }

    /// Sign in and load the user. Returns the landing route for the user's
    /// type, or [`Route::Login`] if the user could not be loaded afterwards.
    ///
    /// # Errors
    /// The login call's error, after recording it and clearing the session.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Route> {
        let _loading = self.handle.begin();
        if let Err(err) = self.auth.login(credentials).await {
            self.handle.update(Session::sign_out);
            self.handle.fail(err.message_or("Login failed"));
            return Err(err);
        }

        self.resolve().await;
        let session = self.snapshot();
        info!(
            authenticated = session.is_authenticated,
            admin = session.is_admin,
            "signed in"
        );
        Ok(session.landing_route())
    }

    /// Create an account, then load it as the current user.
    ///
    /// # Errors
    /// The registration call's error, after recording it.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<Route> {
        let _loading = self.handle.begin();
        if let Err(err) = self.auth.register(request).await {
            self.handle.fail(err.message_or("Register failed"));
            return Err(err);
        }

        self.resolve().await;
        Ok(self.snapshot().landing_route())
    }

    /// End the session. The local session is cleared and the login route
    /// returned even when the backend call fails; the failure is recorded in
    /// `error`.
    pub async fn logout(&self) -> Route {
        let _loading = self.handle.begin();
        if let Err(err) = self.auth.logout().await {
            self.handle.fail(err.message_or("Logout failed"));
        }
        self.handle.update(Session::sign_out);
        info!("signed out");
        Route::Login
    }
}

#[async_trait]
impl SessionSource for SessionStore {
    fn session(&self) -> Session {
        self.snapshot()
    }

    async fn check_auth(&self) {
        self.resolve().await;
    }
}
