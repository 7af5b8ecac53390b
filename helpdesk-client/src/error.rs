//! Errors returned by backend calls.

use reqwest::StatusCode;
use serde_json::Value;
use shared::models::ErrorResponse;
use thiserror::Error;

/// Result of a backend call.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failure of a backend call.
///
/// A CSRF rejection and invalid credentials both arrive as
/// [`ClientError::Status`] with 401/403; the client cannot tell them apart.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response was received.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a status of 400 or above.
    #[error("request failed with {status}{}", describe_body(.data))]
    Status {
        /// Status of the answer.
        status: StatusCode,
        /// Response body, decoded like a successful one.
        data: Value,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request path could not be resolved against the backend origin.
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An identifier that cannot stand as one path segment.
    #[error("invalid identifier '{0}'")]
    InvalidId(String),
}

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Nothing came back: connection, DNS, TLS or timeout.
    Network,
    /// The backend answered with an error status.
    Rejected,
    /// The answer had an unexpected shape.
    Decode,
    /// The request was never sent because its URL was unusable.
    InvalidUrl,
}

impl ClientError {
    /// Which of the broad failure classes this is.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Status { .. } => ErrorKind::Rejected,
            Self::Decode(_) => ErrorKind::Decode,
            Self::InvalidUrl(_) | Self::InvalidId(_) => ErrorKind::InvalidUrl,
        }
    }

    /// HTTP status, when the backend responded.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(err) => err.status(),
            _ => None,
        }
    }

    /// The backend's error body, when it has the usual `{ message, errors }` shape.
    #[must_use]
    pub fn error_body(&self) -> Option<ErrorResponse> {
        let Self::Status { data, .. } = self else {
            return None;
        };
        serde_json::from_value(data.clone()).ok()
    }

    /// The `message` field of the backend's error body, if there is one.
    #[must_use]
    pub fn backend_message(&self) -> Option<String> {
        self.error_body()
            .map(|body| body.message)
            .filter(|message| !message.trim().is_empty())
    }

    /// 401 or 403: bad credentials, expired session or rejected CSRF token.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        )
    }

    /// Human-readable message: the backend's own when present, else `fallback`.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.backend_message()
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// `": message (field: problem; ...)"` for error bodies that carry a message.
fn describe_body(data: &Value) -> String {
    serde_json::from_value::<ErrorResponse>(data.clone())
        .ok()
        .filter(|body| !body.message.trim().is_empty() || body.has_field_errors())
        .map(|body| format!(": {body}"))
        .unwrap_or_default()
}
