//! The check a rule runs and the verdict it records into.

use crate::core::RuleError;
use crate::effects::Invocation;

/// A rule's own validation logic.
///
/// The check receives the rule's [`Verdict`] and calls
/// [`Verdict::invalidate`] for every problem it finds. Returning without
/// invalidating means the rule passes. An `Err` from the invocation is fatal
/// and aborts the whole validation.
///
/// # Example
///
/// ```rust
/// use rulebook::{Check, Invocation, Verdict};
///
/// struct NotEmpty(String);
///
/// impl Check for NotEmpty {
///     fn on_validate<'a>(&'a self, verdict: &'a mut Verdict) -> Invocation<'a, ()> {
///         Invocation::future(async move {
///             if self.0.is_empty() {
///                 verdict.invalidate("value must not be empty");
///             }
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Check: Send + Sync {
    fn on_validate<'a>(&'a self, verdict: &'a mut Verdict) -> Invocation<'a, ()>;
}

/// Synchronous check built from a closure.
pub(crate) struct FnCheck<F>(pub(crate) F);

impl<F> Check for FnCheck<F>
where
    F: Fn(&mut Verdict) + Send + Sync,
{
    fn on_validate<'a>(&'a self, verdict: &'a mut Verdict) -> Invocation<'a, ()> {
        (self.0)(verdict);
        Invocation::ready(Ok(()))
    }
}

/// What a call to [`Verdict::invalidate`] records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invalidation {
    /// Attributed to the rule's association
    Message(String),
    /// Recorded as given
    Error(RuleError),
    /// Recorded as given, in order
    Errors(Vec<RuleError>),
}

impl From<&str> for Invalidation {
    fn from(message: &str) -> Self {
        Invalidation::Message(message.to_string())
    }
}

impl From<String> for Invalidation {
    fn from(message: String) -> Self {
        Invalidation::Message(message)
    }
}

impl From<RuleError> for Invalidation {
    fn from(error: RuleError) -> Self {
        Invalidation::Error(error)
    }
}

impl From<Vec<RuleError>> for Invalidation {
    fn from(errors: Vec<RuleError>) -> Self {
        Invalidation::Errors(errors)
    }
}

/// Validity and errors of one rule during and after validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    association: Option<String>,
    valid: bool,
    errors: Vec<RuleError>,
}

impl Verdict {
    pub(crate) fn new(association: Option<String>) -> Self {
        Self {
            association,
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Record a failure and mark the rule invalid.
    ///
    /// An empty error list records nothing and leaves validity untouched,
    /// so a rule found invalid by its checks always carries at least one error.
    pub fn invalidate(&mut self, reason: impl Into<Invalidation>) {
        match reason.into() {
            Invalidation::Message(message) => self.errors.push(RuleError {
                association: self.association.clone(),
                message,
            }),
            Invalidation::Error(error) => self.errors.push(error),
            Invalidation::Errors(errors) if errors.is_empty() => return,
            Invalidation::Errors(errors) => self.errors.extend(errors),
        }
        self.valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[RuleError] {
        &self.errors
    }

    pub fn association(&self) -> Option<&str> {
        self.association.as_deref()
    }

    pub(crate) fn set_association(&mut self, association: Option<String>) {
        self.association = association;
    }

    pub(crate) fn reset(&mut self) {
        self.valid = true;
        self.errors.clear();
    }

    /// Replace this verdict's errors with those of failed successors.
    pub(crate) fn adopt(&mut self, errors: Vec<RuleError>) {
        self.errors = errors;
        self.valid = false;
    }

    /// Validation was interrupted by a fatal error. Errors recorded so far
    /// are kept.
    pub(crate) fn abort(&mut self) {
        self.valid = false;
    }

    /// An alternative path validated: forget the failure.
    pub(crate) fn recover(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_attributed_to_association() {
        let mut verdict = Verdict::new(Some("a".to_string()));
        verdict.invalidate("x");

        assert!(!verdict.is_valid());
        assert_eq!(verdict.errors(), &[RuleError::for_association("a", "x")]);
    }

    #[test]
    fn explicit_errors_are_kept_as_given() {
        let mut verdict = Verdict::new(Some("a".to_string()));
        verdict.invalidate(RuleError::new("plain"));
        verdict.invalidate(vec![
            RuleError::for_association("b", "one"),
            RuleError::for_association("c", "two"),
        ]);

        assert_eq!(
            verdict.errors(),
            &[
                RuleError::new("plain"),
                RuleError::for_association("b", "one"),
                RuleError::for_association("c", "two"),
            ]
        );
    }

    #[test]
    fn empty_error_list_is_a_no_op() {
        let mut verdict = Verdict::new(None);
        verdict.invalidate(Vec::<RuleError>::new());

        assert!(verdict.is_valid());
        assert!(verdict.errors().is_empty());
    }

    #[test]
    fn recover_clears_failure() {
        let mut verdict = Verdict::new(None);
        verdict.invalidate("bad");
        verdict.recover();

        assert!(verdict.is_valid());
        assert!(verdict.errors().is_empty());
    }

    #[test]
    fn abort_keeps_recorded_errors() {
        let mut verdict = Verdict::new(None);
        verdict.abort();
        assert!(!verdict.is_valid());
        assert!(verdict.errors().is_empty());

        let mut verdict = Verdict::new(None);
        verdict.invalidate("partial");
        verdict.abort();
        assert_eq!(verdict.errors(), &[RuleError::new("partial")]);
    }

    #[test]
    fn adopt_replaces_errors() {
        let mut verdict = Verdict::new(None);
        verdict.invalidate("own");
        verdict.adopt(vec![RuleError::new("child")]);

        assert!(!verdict.is_valid());
        assert_eq!(verdict.errors(), &[RuleError::new("child")]);
    }
}
