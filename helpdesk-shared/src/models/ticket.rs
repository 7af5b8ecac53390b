//! Tickets, their comments and workflow request bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Resource, ResourceId, User, lenient};

/// A support ticket.
///
/// Only `id` is required to have a fixed shape. Attributes the client reads
/// fall back to empty when the backend sends something unexpected, and
/// attributes it merely displays are kept as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    /// Ticket number.
    pub id: ResourceId,

    /// Subject line.
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,

    /// Body text as submitted.
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,

    /// Workflow status as named by the backend (`open`, `in_progress`, ...).
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,

    /// Priority label or level, as sent.
    #[serde(default)]
    pub priority: Option<Value>,

    /// Category the ticket is filed under.
    #[serde(default, deserialize_with = "lenient")]
    pub category_id: Option<ResourceId>,

    /// Assigned technician: an id, or the eager-loaded user record.
    #[serde(default)]
    pub assigned_to: Option<Value>,

    /// Any other attributes the backend sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ticket {
    /// Identifier of the assigned technician, whichever shape `assigned_to` has.
    #[must_use]
    pub fn assignee_id(&self) -> Option<ResourceId> {
        match self.assigned_to.as_ref()? {
            Value::Object(user) => user.get("id").and_then(Value::as_u64),
            other => other.as_u64(),
        }
    }
}

impl Resource for Ticket {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Fields accepted when opening or editing a ticket.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketDraft {
    /// New subject line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New priority label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// New category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<ResourceId>,
}

/// A comment left on a ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    /// Comment identifier.
    pub id: ResourceId,

    /// Comment text.
    #[serde(default, deserialize_with = "lenient")]
    pub content: String,

    /// Author, when the backend embeds it.
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<User>,

    /// Creation timestamp as sent.
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,

    /// Any other attributes the backend sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Comment {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Body of `POST /api/tickets/{id}/comments`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentRequest {
    /// Comment text.
    pub content: String,
}

/// Body of `PATCH /api/tickets/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusRequest {
    /// Target workflow status.
    pub status: String,
}

/// Body of `PATCH /api/tickets/{id}/assign`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignRequest {
    /// Technician receiving the ticket.
    pub user_id: ResourceId,
}
