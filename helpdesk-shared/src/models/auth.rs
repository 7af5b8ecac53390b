//! Request bodies for signing in and registering.

use serde::{Deserialize, Serialize};

use super::UserType;

/// Body of `POST /api/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Account email address.
    pub email: String,

    /// Plain-text password, sent over the credentialed connection only.
    pub password: String,

    /// Ask the backend for a long-lived "remember me" session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remember: Option<bool>,
}

impl Credentials {
    /// Credentials without the "remember me" flag.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            remember: None,
        }
    }
}

/// Body of `POST /api/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Display name for the new account.
    pub name: String,
    /// Login email address.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Must repeat `password`; the backend checks the match.
    pub password_confirmation: String,

    /// Requested account type; the backend decides whether to honour it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
}
