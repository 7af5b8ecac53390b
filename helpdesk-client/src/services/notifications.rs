//! Notification endpoints.

use reqwest::Method;
use serde_json::Value;
use shared::models::{ListPayload, Notification, UnreadCount};
use tracing::{debug, warn};

use super::{Gateway, path_segment};
use crate::{error::ClientResult, http::RequestOptions};

/// `/api/notifications`
#[derive(Clone, Debug)]
pub struct NotificationService {
    gateway: Gateway,
}

impl NotificationService {
    /// Service over `gateway`.
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// All notifications of the signed-in user.
    ///
    /// # Errors
    /// Transport, status or decode failures.
    pub async fn list(&self) -> ClientResult<Vec<Notification>> {
        let payload: ListPayload<Notification> = self
            .gateway
            .fetch("list notifications", "api/notifications", RequestOptions::new())
            .await?;
        Ok(payload.into_vec())
    }

    /// Marks one notification as read.
    ///
    /// # Errors
    /// [`crate::ClientError::InvalidId`] for ids that cannot stand as one path
    /// segment; otherwise priming, transport or status failures.
    pub async fn mark_as_read(&self, id: &str) -> ClientResult<Value> {
        let path = format!("api/notifications/{}/read", path_segment(id)?);
        self.gateway
            .mutate(
                "mark notification read",
                Method::POST,
                &path,
                RequestOptions::new().json(&serde_json::json!({}))?,
            )
            .await
    }

    /// Marks every notification as read.
    ///
    /// # Errors
    /// Priming, transport or status failures.
    pub async fn mark_all_as_read(&self) -> ClientResult<Value> {
        self.gateway
            .mutate(
                "mark all notifications read",
                Method::POST,
                "api/notifications/read-all",
                RequestOptions::new().json(&serde_json::json!({}))?,
            )
            .await
    }

    /// Unread counter. Never fails: an unreadable answer or a failed request
    /// counts as zero.
    pub async fn unread_count(&self) -> UnreadCount {
        let path = "api/notifications/unread-count";
        let options = RequestOptions::new();
        match self.gateway.fetch::<Value>("unread count", path, options).await {
            Ok(value) => {
                let count = UnreadCount::from_value(&value);
                if count.count == 0 && !is_known_shape(&value) {
                    debug!(payload = %value, "unexpected unread count response format");
                }
                count
            }
            Err(err) => {
                warn!(error = %err, "falling back to zero unread notifications");
                UnreadCount::default()
            }
        }
    }
}

fn is_known_shape(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::Object(fields) => {
            fields.contains_key("unread_count") || fields.contains_key("count")
        }
        _ => false,
    }
}
