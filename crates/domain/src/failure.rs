//! A single validation failure reported by a validator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One failed rule: the field path it fired on, a human-readable message, and
/// an optional stable error code.
///
/// Failures are never mutated after creation. Their ordering inside a verdict
/// is the order validators were registered, then the order rules fired within
/// a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    field: Box<str>,
    message: Box<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<Box<str>>,
}

impl Failure {
    /// Create a failure for a field path with a message.
    pub fn new(field: impl Into<Box<str>>, message: impl Into<Box<str>>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: None,
        }
    }

    /// Attach a stable error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<Box<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Field path the failure fired on.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Human-readable failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Optional stable error code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code.as_deref() {
            Some(code) => write!(
                formatter,
                "{}: {} ({code})",
                self.field, self.message
            ),
            None => write!(formatter, "{}: {}", self.field, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_field_and_message() {
        let failure = Failure::new("name", "must not be empty");
        assert_eq!(failure.field(), "name");
        assert_eq!(failure.message(), "must not be empty");
        assert_eq!(failure.code(), None);
        assert_eq!(failure.to_string(), "name: must not be empty");
    }

    #[test]
    fn failure_code_is_optional() {
        let failure = Failure::new("name", "must not be empty").with_code("not_empty");
        assert_eq!(failure.code(), Some("not_empty"));
        assert_eq!(failure.to_string(), "name: must not be empty (not_empty)");
    }

    #[test]
    fn failure_round_trips_through_json() {
        let failure = Failure::new("amount", "out of range").with_code("range");
        let json = serde_json::to_string(&failure).map_err(|error| error.to_string());
        let Ok(json) = json else {
            unreachable!("failure must serialize");
        };
        let parsed: Result<Failure, _> = serde_json::from_str(&json);
        assert_eq!(parsed.ok(), Some(failure));
    }
}
