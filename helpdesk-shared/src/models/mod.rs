//! Records and request bodies exchanged with the backend.

pub mod admin;
pub mod auth;
pub mod category;
pub mod errors;
pub mod list;
pub mod notification;
pub mod ticket;
pub mod user;

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;
use std::fmt::Display;

pub use admin::{AdminUser, Permission, Role, RolesPermissionsRequest};
pub use auth::{Credentials, RegisterRequest};
pub use category::{Category, CategoryDraft};
pub use errors::ErrorResponse;
pub use list::{ItemPayload, ListPayload};
pub use notification::{Notification, UnreadCount};
pub use ticket::{AssignRequest, Comment, CommentRequest, StatusRequest, Ticket, TicketDraft};
pub use user::{User, UserType};

/// Numeric primary key used by most backend resources.
pub type ResourceId = u64;

/// A backend record addressable by an identifier.
pub trait Resource {
    /// Identifier type used in `/api/{resource}/{id}` paths.
    type Id: PartialEq + Display + Clone + Send + Sync;

    /// The record's identifier.
    fn id(&self) -> &Self::Id;
}

/// Decode a field the client does not interpret, falling back to the type's
/// default when the backend sends an unexpected shape.
///
/// Records are only required to carry an `id`; one odd attribute must not
/// make a whole list undecodable.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
