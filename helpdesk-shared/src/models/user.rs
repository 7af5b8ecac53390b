//! The signed-in account and its type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};

use super::{Resource, ResourceId, lenient};

/// Account type assigned by the backend.
///
/// Values outside the known set decode to [`UserType::Unknown`] so a new
/// backend role never breaks session loading; unknown types get no elevated
/// access.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserType {
    /// Full access, including the administration area.
    Administrator,
    /// Oversees technicians and ticket flow.
    Supervisor,
    /// Works assigned tickets.
    Technician,
    /// Opens tickets.
    Customer,
    /// Any other value sent by the backend, kept verbatim.
    Unknown(String),
}

impl UserType {
    /// Return the wire representation used by the backend.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Administrator => "administrator",
            Self::Supervisor => "supervisor",
            Self::Technician => "technician",
            Self::Customer => "customer",
            Self::Unknown(value) => value,
        }
    }

    /// Whether this account may enter the administration area.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Administrator)
    }
}

impl Default for UserType {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl From<String> for UserType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "administrator" => Self::Administrator,
            "supervisor" => Self::Supervisor,
            "technician" => Self::Technician,
            "customer" => Self::Customer,
            _ => Self::Unknown(value),
        }
    }
}

impl From<UserType> for String {
    fn from(value: UserType) -> Self {
        match value {
            UserType::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match Self::from(value.to_string()) {
            Self::Unknown(_) => Err("unknown user type"),
            known => Ok(known),
        }
    }
}

/// The authenticated account returned by `GET /api/user`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier for the user.
    pub id: ResourceId,

    /// Display name.
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,

    /// The user's email address.
    #[serde(default, deserialize_with = "lenient")]
    pub email: String,

    /// Account type; older payloads call this field `role`.
    #[serde(default, alias = "role", deserialize_with = "lenient")]
    pub user_type: UserType,

    /// Any other attributes the backend sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Whether this user may enter the administration area.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user_type.is_admin()
    }
}

impl Resource for User {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
