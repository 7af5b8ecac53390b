//! Account administration records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Resource, ResourceId, UserType, lenient};

/// A named permission managed from the administration area.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Permission {
    /// Permission identifier.
    pub id: ResourceId,
    /// Permission name, e.g. `tickets.delete`.
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    /// Any other attributes the backend sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A role attached to an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    /// Role identifier.
    pub id: ResourceId,
    /// Role name.
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    /// Any other attributes the backend sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An account as listed by `GET /api/admin/users`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminUser {
    /// Account identifier.
    pub id: ResourceId,

    /// Display name.
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,

    /// Login email address.
    #[serde(default, deserialize_with = "lenient")]
    pub email: String,

    /// Account type; older payloads call this field `role`.
    #[serde(default, alias = "role", deserialize_with = "lenient")]
    pub user_type: UserType,

    /// Roles attached to the account.
    #[serde(default, deserialize_with = "lenient")]
    pub roles: Vec<Role>,

    /// Permissions granted directly to the account.
    #[serde(default, deserialize_with = "lenient")]
    pub permissions: Vec<Permission>,

    /// Any other attributes the backend sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for AdminUser {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Body of `POST /api/admin/users/{id}/roles-permissions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RolesPermissionsRequest {
    /// Permission names granted to the account, replacing the previous set.
    pub permissions: Vec<String>,
}
