//! Rule errors and the service exception.
//!
//! Both are plain data: a [`RuleError`] is what a rule records when it
//! invalidates, and a [`ServiceException`] is how business logic signals an
//! expected failure carrying its own rule errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single validation failure, optionally attributed to a field or label.
///
/// # Example
///
/// ```rust
/// use rulebook::RuleError;
///
/// let error = RuleError::for_association("name", "name not supplied");
/// assert_eq!(error.association.as_deref(), Some("name"));
/// assert_eq!(error.to_string(), "name: name not supplied");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleError {
    /// The field or label the error is attributed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association: Option<String>,
    /// Human readable description of the failure
    pub message: String,
}

impl RuleError {
    /// Create an error without an association.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            association: None,
            message: message.into(),
        }
    }

    /// Create an error attributed to `association`.
    pub fn for_association(association: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            association: Some(association.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.association {
            Some(association) => write!(f, "{}: {}", association, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Expected business failure raised from business logic.
///
/// When returned from `on_validation_success` the pipeline converts it into a
/// failed [`ExecutionResult`](crate::ExecutionResult) carrying `errors`.
/// Raised from any other hook it is treated like every other error: fatal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceException {
    pub message: String,
    pub errors: Vec<RuleError>,
}

impl ServiceException {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Append a rule error (builder form).
    pub fn with_error(mut self, error: RuleError) -> Self {
        self.errors.push(error);
        self
    }

    /// Append a rule error.
    pub fn push_error(&mut self, error: RuleError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[RuleError] {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_error_display_includes_association() {
        assert_eq!(RuleError::new("x").to_string(), "x");
        assert_eq!(RuleError::for_association("a", "x").to_string(), "a: x");
    }

    #[test]
    fn rule_error_omits_missing_association_when_serialized() {
        let json = serde_json::to_value(RuleError::new("bad")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "bad" }));

        let json = serde_json::to_value(RuleError::for_association("age", "too low")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "association": "age", "message": "too low" })
        );
    }

    #[test]
    fn rule_error_deserializes_without_association() {
        let error: RuleError = serde_json::from_str(r#"{"message":"bad"}"#).unwrap();
        assert_eq!(error, RuleError::new("bad"));
    }

    #[test]
    fn service_exception_collects_errors() {
        let mut exception = ServiceException::new("update rejected")
            .with_error(RuleError::for_association("name", "name not supplied"));
        exception.push_error(RuleError::new("stale version"));

        assert_eq!(exception.to_string(), "update rejected");
        assert_eq!(exception.errors().len(), 2);
        assert_eq!(exception.errors()[1].message, "stale version");
    }
}
