//! Error types for rendering and scheduling.

use std::fmt::Display;

use serde_json::Value;
use thiserror::Error;
use vode_dom::DomError;

/// Errors that can occur while rendering or patching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VodeError {
    /// A tree value that is neither text, an element nor a no-render value
    #[error("Invalid vode: {kind} {json}")]
    InvalidVode { kind: &'static str, json: String },

    /// A fallible component failed
    #[error("Render failed: {0}")]
    Render(String),

    /// A document operation failed
    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    /// The container has no parent to render into
    #[error("Container must be attached to a parent node")]
    InvalidContainer,

    /// The initial state is not a JSON object
    #[error("State must be a JSON object")]
    InvalidState,

    /// The app was torn down with `defuse`
    #[error("App has been defused")]
    Defused,
}

impl VodeError {
    /// Failure raised from inside a component.
    pub fn render(message: impl Display) -> Self {
        VodeError::Render(message.to_string())
    }

    pub(crate) fn invalid_vode(value: &Value) -> Self {
        VodeError::InvalidVode {
            kind: json_kind(value),
            json: value.to_string(),
        }
    }

    /// Whether a `catch` prop may recover from this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, VodeError::Defused)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Result type for vode operations.
pub type Result<T, E = VodeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_vode_message() {
        let err = VodeError::invalid_vode(&json!({"a": 1}));
        assert_eq!(err.to_string(), r#"Invalid vode: object {"a":1}"#);
    }

    #[test]
    fn test_recoverable() {
        assert!(VodeError::render("boom").is_recoverable());
        assert!(!VodeError::Defused.is_recoverable());
    }
}
