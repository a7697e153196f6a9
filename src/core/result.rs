//! The uniform outcome of a command run.

use super::error::{RuleError, ServiceException};
use crate::effects::PipelineError;
use serde::Serialize;

/// Outcome of executing a command.
///
/// Exactly one side is populated: a successful result has a value and no
/// errors, a failed result has a non-empty error list and no value. The
/// fields are private so the pair can only be built through
/// [`success`](Self::success) and [`failure`](Self::failure).
///
/// # Example
///
/// ```rust
/// use rulebook::{ExecutionResult, RuleError};
///
/// let ok = ExecutionResult::success(42);
/// assert!(ok.is_success());
/// assert_eq!(ok.value(), Some(&42));
/// assert!(ok.errors().is_none());
///
/// let failed = ExecutionResult::<i32>::failure(vec![RuleError::new("bad")]).unwrap();
/// assert!(!failed.is_success());
/// assert!(failed.value().is_none());
/// assert_eq!(failed.errors().unwrap().len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExecutionResult<T> {
    success: bool,
    value: Option<T>,
    errors: Option<Vec<RuleError>>,
}

impl<T> ExecutionResult<T> {
    pub fn success(value: T) -> Self {
        Self {
            success: true,
            value: Some(value),
            errors: None,
        }
    }

    /// Build a failed result.
    ///
    /// A failure must carry at least one error; an empty list is rejected
    /// with [`PipelineError::EmptyFailure`].
    pub fn failure(errors: Vec<RuleError>) -> Result<Self, PipelineError> {
        if errors.is_empty() {
            return Err(PipelineError::EmptyFailure);
        }
        Ok(Self {
            success: false,
            value: None,
            errors: Some(errors),
        })
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn errors(&self) -> Option<&[RuleError]> {
        self.errors.as_deref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub fn into_errors(self) -> Option<Vec<RuleError>> {
        self.errors
    }

    /// Convert into a `Result`, `Err` holding the rule errors of a failure.
    pub fn into_result(self) -> Result<T, Vec<RuleError>> {
        match (self.value, self.errors) {
            (Some(value), None) => Ok(value),
            (_, errors) => Err(errors.unwrap_or_default()),
        }
    }

    /// Map the success value, leaving a failure untouched.
    pub fn map<U, F>(self, f: F) -> ExecutionResult<U>
    where
        F: FnOnce(T) -> U,
    {
        ExecutionResult {
            success: self.success,
            value: self.value.map(f),
            errors: self.errors,
        }
    }
}

impl<T> From<ServiceException> for ExecutionResult<T> {
    /// An exception raised without rule errors still yields a well formed
    /// failure: its message becomes the single error.
    fn from(exception: ServiceException) -> Self {
        let errors = if exception.errors.is_empty() {
            vec![RuleError::new(exception.message)]
        } else {
            exception.errors
        };
        Self {
            success: false,
            value: None,
            errors: Some(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_value_and_no_errors() {
        let result = ExecutionResult::success("done");

        assert!(result.is_success());
        assert_eq!(result.value(), Some(&"done"));
        assert!(result.errors().is_none());
        assert_eq!(result.into_result(), Ok("done"));
    }

    #[test]
    fn failure_has_errors_and_no_value() {
        let result =
            ExecutionResult::<u32>::failure(vec![RuleError::for_association("a", "x")]).unwrap();

        assert!(!result.is_success());
        assert!(result.value().is_none());
        assert_eq!(
            result.into_result(),
            Err(vec![RuleError::for_association("a", "x")])
        );
    }

    #[test]
    fn failure_rejects_empty_errors() {
        let result = ExecutionResult::<u32>::failure(Vec::new());
        assert!(matches!(result, Err(PipelineError::EmptyFailure)));
    }

    #[test]
    fn service_exception_converts_to_failure() {
        let exception = ServiceException::new("rejected")
            .with_error(RuleError::for_association("name", "name not supplied"));
        let result: ExecutionResult<()> = exception.into();

        assert!(!result.is_success());
        assert_eq!(
            result.errors(),
            Some(&[RuleError::for_association("name", "name not supplied")][..])
        );
    }

    #[test]
    fn service_exception_without_errors_uses_message() {
        let result: ExecutionResult<()> = ServiceException::new("quota exhausted").into();
        assert_eq!(result.errors(), Some(&[RuleError::new("quota exhausted")][..]));
    }

    #[test]
    fn map_only_touches_success() {
        assert_eq!(ExecutionResult::success(2).map(|v| v * 10).value(), Some(&20));

        let failed = ExecutionResult::<i32>::failure(vec![RuleError::new("x")])
            .unwrap()
            .map(|v| v * 10);
        assert!(failed.value().is_none());
        assert_eq!(failed.errors().map(<[_]>::len), Some(1));
    }

    #[test]
    fn result_serializes_with_nulls() {
        let json = serde_json::to_value(ExecutionResult::success(7)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": true, "value": 7, "errors": null })
        );
    }
}
