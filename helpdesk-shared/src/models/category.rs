//! Ticket categories.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Resource, ResourceId, lenient};

/// A ticket category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Category identifier.
    pub id: ResourceId,

    /// Display name.
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,

    /// Optional longer description.
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,

    /// Any other attributes the backend sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Category {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Fields accepted when creating or renaming a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDraft {
    /// Display name.
    pub name: String,
    /// Optional longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
