//! Login, registration, logout and the current user.

use reqwest::Method;
use serde_json::Value;
use shared::models::{Credentials, ItemPayload, RegisterRequest, User};

use super::Gateway;
use crate::{error::ClientResult, http::RequestOptions};

/// Session lifecycle endpoints.
#[derive(Clone, Debug)]
pub struct AuthService {
    gateway: Gateway,
}

impl AuthService {
    /// Service over `gateway`.
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// `POST /api/login`.
    ///
    /// # Errors
    /// Priming, transport or status failures. A 401/403 may mean either bad
    /// credentials or a rejected CSRF token.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Value> {
        self.gateway
            .mutate(
                "login",
                Method::POST,
                "api/login",
                RequestOptions::new().json(credentials)?,
            )
            .await
    }

    /// `POST /api/register`.
    ///
    /// # Errors
    /// Priming, transport or status failures.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<Value> {
        self.gateway
            .mutate(
                "register",
                Method::POST,
                "api/register",
                RequestOptions::new().json(request)?,
            )
            .await
    }

    /// `POST /api/logout`.
    ///
    /// # Errors
    /// Priming, transport or status failures.
    pub async fn logout(&self) -> ClientResult<Value> {
        self.gateway
            .mutate("logout", Method::POST, "api/logout", RequestOptions::new())
            .await
    }

    /// `GET /api/user`: who am I.
    ///
    /// # Errors
    /// Transport, status or decode failures; 401 when there is no session.
    pub async fn current_user(&self) -> ClientResult<User> {
        let payload: ItemPayload<User> = self
            .gateway
            .fetch("current user", "api/user", RequestOptions::new())
            .await?;
        Ok(payload.into_inner())
    }
}
