//! Wiring of transport, services and stores for one backend.

use reqwest::cookie::Jar;
use shared::config::ClientConfig;
use std::sync::Arc;
use tracing::debug;

use crate::{
    csrf::CsrfManager,
    error::ClientResult,
    guard::Navigator,
    http::ApiClient,
    services::{
        AdminService, AuthService, CategoryService, Gateway, NotificationService, TicketService,
        UserService,
    },
    stores::{AdminStore, CategoryStore, NotificationStore, SessionStore, TicketStore},
};

/// A fully wired client: one cookie jar, one CSRF manager, and a store per
/// domain area.
///
/// Cloning is cheap and clones share all state.
#[derive(Clone, Debug)]
pub struct Helpdesk {
    api: ApiClient,
    gateway: Gateway,
    session: SessionStore,
    tickets: TicketStore,
    categories: CategoryStore,
    notifications: NotificationStore,
    admin: AdminStore,
}

impl Helpdesk {
    /// Client with an empty cookie jar.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Self::with_jar(config, Arc::new(Jar::default()))
    }

    /// Build on top of an existing cookie jar, e.g. one restored from disk.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_jar(config: &ClientConfig, jar: Arc<Jar>) -> ClientResult<Self> {
        let api = ApiClient::with_jar(config, jar)?;
        let csrf = CsrfManager::new(api.clone(), config);
        let gateway = Gateway::new(api.clone(), csrf);
        debug!(base_url = %api.base_url(), "helpdesk client ready");

        Ok(Self {
            session: SessionStore::new(AuthService::new(gateway.clone())),
            tickets: TicketStore::new(TicketService::new(gateway.clone())),
            categories: CategoryStore::new(CategoryService::new(gateway.clone(), "categories")),
            notifications: NotificationStore::new(NotificationService::new(gateway.clone())),
            admin: AdminStore::new(AdminService::new(gateway.clone())),
            api,
            gateway,
        })
    }

    /// Credentialed transport.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Direct access to the services, bypassing the stores.
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// `/api/users` as plain CRUD.
    #[must_use]
    pub fn users(&self) -> UserService {
        UserService::new(self.gateway.clone(), "users")
    }

    /// Session and login flows.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Ticket store.
    #[must_use]
    pub fn tickets(&self) -> &TicketStore {
        &self.tickets
    }

    /// Category store.
    #[must_use]
    pub fn categories(&self) -> &CategoryStore {
        &self.categories
    }

    /// Notification store.
    #[must_use]
    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    /// Administration store.
    #[must_use]
    pub fn admin(&self) -> &AdminStore {
        &self.admin
    }

    /// A navigator guarded by this client's session.
    #[must_use]
    pub fn navigator(&self) -> Navigator<SessionStore> {
        Navigator::new(self.session.clone())
    }
}
