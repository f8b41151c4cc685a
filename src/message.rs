//! Structured validation failures.

use std::fmt;

/// One validation failure: a schema-relative location plus a human-readable
/// reason. Leaf validation always reports an empty location; a composite
/// validator re-roots the messages it aggregates under its own path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    location: String,
    message: String,
}

impl ErrorMessage {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Re-attribute this failure to a position beneath `prefix`, e.g. the
    /// field or index a composite validator was visiting.
    pub fn prefixed(&self, prefix: &str) -> Self {
        let location = if self.location.is_empty() {
            prefix.to_string()
        } else {
            format!("{prefix}.{}", self.location)
        };
        Self {
            location,
            message: self.message.clone(),
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}
