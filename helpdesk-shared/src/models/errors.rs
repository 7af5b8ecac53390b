//! Error bodies sent by the backend.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error body returned by the backend on rejected requests.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// The main error message
    #[serde(default)]
    pub message: String,

    /// Per-field validation messages, present on 422 responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorResponse {
    /// Checks if this error response carries field validation errors.
    #[must_use]
    pub fn has_field_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|errors| !errors.is_empty())
    }

    /// Every `(field, message)` pair, fields in name order.
    pub fn field_messages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().flatten().flat_map(|(field, messages)| {
            messages
                .iter()
                .map(move |message| (field.as_str(), message.as_str()))
        })
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)?;
        if self.has_field_errors() {
            let details = self
                .field_messages()
                .map(|(field, message)| format!("{field}: {message}"))
                .collect::<Vec<_>>()
                .join("; ");
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorResponse {}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_only(message: &str) -> ErrorResponse {
        ErrorResponse {
            message: message.to_string(),
            errors: None,
        }
    }

    /// Test validation error deserialization
    #[test]
    fn test_validation_error_deserialization() {
        let json = r#"{"message":"The given data was invalid.","errors":{"email":["The email field is required."]}}"#;
        let error: ErrorResponse = serde_json::from_str(json).unwrap();
        assert!(error.has_field_errors());
        assert_eq!(
            error.field_messages().collect::<Vec<_>>(),
            vec![("email", "The email field is required.")]
        );
        assert!(!message_only("Unauthenticated.").has_field_errors());
    }

    /// Test ErrorResponse Display implementation
    #[test]
    fn test_error_response_display() {
        assert_eq!(message_only("Unauthenticated.").to_string(), "Unauthenticated.");

        let json = r#"{"message":"Invalid","errors":{"title":["required"],"category_id":["missing","unknown"]}}"#;
        let error: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            error.to_string(),
            "Invalid (category_id: missing; category_id: unknown; title: required)"
        );
    }

    /// Test ErrorResponse serialization skips absent errors
    #[test]
    fn test_error_response_serialization() {
        let json = serde_json::to_string(&message_only("Nope")).unwrap();
        assert_eq!(json, r#"{"message":"Nope"}"#);
    }
}
