//! Notifications and the unread counter.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{Resource, lenient};

/// Timestamp layout used by SQL-backed serializers (`2024-03-01 10:15:00`).
const SQL_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A notification addressed to the current user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    /// Notification identifier; database notifications use UUID strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Notification class reported by the backend.
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,

    /// Free-form payload rendered by the caller.
    #[serde(default)]
    pub data: Value,

    /// When the notification was read, as sent; `None` while unread.
    #[serde(default, deserialize_with = "timestamp")]
    pub read_at: Option<String>,

    /// Creation timestamp as sent.
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,

    /// Any other attributes the backend sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notification {
    /// Whether the backend (or a local mark) stamped this notification.
    #[must_use]
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// `read_at` as a UTC instant, for RFC 3339 and SQL-style timestamps.
    #[must_use]
    pub fn read_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.read_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|time| time.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(raw, SQL_TIMESTAMP).map(|time| time.and_utc())
            })
            .ok()
    }

    /// Stamp the notification as read at `at` unless it already is.
    /// Returns whether it was unread before.
    pub fn mark_read(&mut self, at: DateTime<Utc>) -> bool {
        let was_unread = !self.is_read();
        if was_unread {
            self.read_at = Some(at.to_rfc3339());
        }
        was_unread
    }
}

impl Resource for Notification {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or numeric id, got {other}"
        ))),
    }
}

/// Any non-null value marks the notification read; strings are kept verbatim.
fn timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(value) => Some(value),
        other => Some(other.to_string()),
    })
}

/// Unread notification counter as returned by `GET /api/notifications/unread-count`.
///
/// The endpoint has answered with a bare integer, `{ "unread_count": n }` and
/// `{ "count": n }` over time; any other shape counts as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnreadCount {
    /// Number of unread notifications.
    pub count: u64,
}

impl UnreadCount {
    /// Interpret any of the known payload shapes.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let count = match value {
            Value::Number(number) => number.as_u64(),
            Value::Object(fields) => fields
                .get("unread_count")
                .or_else(|| fields.get("count"))
                .and_then(Value::as_u64),
            _ => None,
        };
        Self {
            count: count.unwrap_or(0),
        }
    }
}
