//! Per-resource wrappers over the backend REST surface.
//!
//! Every call goes through [`Gateway`], which issues the request, logs a
//! failure once with the operation name and hands the error back unchanged.
//! Non-GET calls are CSRF-primed.

pub mod admin;
pub mod auth;
pub mod notifications;
pub mod resource;
pub mod tickets;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::{
    csrf::CsrfManager,
    error::{ClientError, ClientResult},
    http::{ApiClient, RequestOptions},
};

pub use admin::AdminService;
pub use auth::AuthService;
pub use notifications::NotificationService;
pub use resource::{CategoryService, ResourceService, UserService};
pub use tickets::TicketService;

/// Transport shared by all services.
#[derive(Clone, Debug)]
pub struct Gateway {
    api: ApiClient,
    csrf: CsrfManager,
}

/// Characters left as-is inside one path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Percent-encodes `id` so it stays a single path segment.
///
/// # Errors
/// [`ClientError::InvalidId`] for empty, `.` and `..` ids, which URL
/// resolution would treat as directory steps.
pub fn path_segment(id: &str) -> ClientResult<String> {
    if matches!(id, "" | "." | "..") {
        return Err(ClientError::InvalidId(id.to_string()));
    }
    Ok(utf8_percent_encode(id, SEGMENT).to_string())
}

impl Gateway {
    /// Services built from this gateway share its cookie jar.
    #[must_use]
    pub fn new(api: ApiClient, csrf: CsrfManager) -> Self {
        Self { api, csrf }
    }

    /// Plain transport, for calls that skip CSRF priming.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// CSRF manager used by [`Gateway::mutate`].
    #[must_use]
    pub fn csrf(&self) -> &CsrfManager {
        &self.csrf
    }

    /// GET `path` and decode the body.
    ///
    /// # Errors
    /// Transport, status or decode failures, logged under `operation`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let result = match self.api.get(path, options).await {
            Ok(response) => response.json(),
            Err(err) => Err(err),
        };
        result.inspect_err(|err| warn!(operation, path, error = %err, "request failed"))
    }

    /// CSRF-primed request with any non-GET method; returns the raw payload.
    ///
    /// # Errors
    /// Priming, transport or status failures, logged under `operation`.
    pub async fn mutate(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<Value> {
        self.csrf
            .send_mutating(method, path, options)
            .await
            .map(|response| response.data)
            .inspect_err(|err| warn!(operation, path, error = %err, "request failed"))
    }
}
