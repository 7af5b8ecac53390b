//! Response envelopes.

use serde::{Deserialize, Serialize};

/// A collection endpoint answer: either a bare array or a paginator
/// wrapping the page in `data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ListPayload<T> {
    /// A plain JSON array.
    Bare(Vec<T>),
    /// A paginator object; only its `data` page is kept.
    Paginated {
        /// Records of the current page.
        data: Vec<T>,
    },
}

impl<T> ListPayload<T> {
    /// The records, whichever envelope they came in.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Paginated { data: items } => items,
        }
    }
}

/// A single-record answer, optionally wrapped in `data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ItemPayload<T> {
    /// `{ "data": record }`.
    Wrapped {
        /// The record.
        data: T,
    },
    /// The record itself.
    Bare(T),
}

impl<T> ItemPayload<T> {
    /// The record, whichever envelope it came in.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}
