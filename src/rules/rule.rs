//! Rule nodes: a check plus AND successors, OR successors and an optional
//! continuation that supplies more rules once everything else passed.

use super::batch::{collect_errors, validate_nested};
use super::check::{Check, FnCheck, Invalidation, Verdict};
use crate::config::PipelineConfig;
use crate::core::RuleError;
use crate::effects::{Invocation, PipelineError};
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use stillwater::validation::Validation;
use tracing::trace;

/// Side-effect hook run after a rule's own check.
pub type RuleHook = Box<dyn Fn() -> Invocation<'static, ()> + Send + Sync>;

/// Hook supplying additional rules once a rule and its AND successors pass.
pub type RuleProvider = Box<dyn Fn() -> Invocation<'static, RuleSet> + Send + Sync>;

/// One rule or several, as returned by rule discovery hooks.
#[derive(Debug)]
pub enum RuleSet {
    One(Rule),
    Many(Vec<Rule>),
}

impl RuleSet {
    pub fn into_vec(self) -> Vec<Rule> {
        match self {
            RuleSet::One(rule) => vec![rule],
            RuleSet::Many(rules) => rules,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RuleSet::One(_) => 1,
            RuleSet::Many(rules) => rules.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::Many(Vec::new())
    }
}

impl From<Rule> for RuleSet {
    fn from(rule: Rule) -> Self {
        RuleSet::One(rule)
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        RuleSet::Many(rules)
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        RuleSet::Many(iter.into_iter().collect())
    }
}

/// A node in a rule tree.
///
/// Validation runs the rule's own [`Check`], then:
/// - when valid, the `on_valid` hook, the AND successors and, if those all
///   pass, the continuation's rules; any failure among them replaces this
///   rule's errors and makes it invalid
/// - when invalid, the `on_invalid` hook and the OR successors; if they all
///   pass the rule recovers, otherwise it adopts their errors
///
/// The outcome is read back through [`is_valid`](Self::is_valid) and
/// [`errors`](Self::errors).
///
/// # Example
///
/// ```rust
/// use rulebook::Rule;
///
/// # futures::executor::block_on(async {
/// let mut rule = Rule::predicate("customer is active", || true)
///     .with_association("customer")
///     .if_valid_then_validate(Rule::predicate("credit limit reached", || false));
///
/// rule.validate().await.unwrap();
///
/// assert!(!rule.is_valid());
/// assert_eq!(rule.errors()[0].message, "credit limit reached");
/// # });
/// ```
///
/// `validate` borrows the rule mutably, so one instance cannot be validated
/// twice at the same time:
///
/// ```compile_fail
/// use rulebook::Rule;
///
/// # futures::executor::block_on(async {
/// let mut rule = Rule::noop();
/// let first = rule.validate();
/// let second = rule.validate();
/// futures::join!(first, second);
/// # });
/// ```
pub struct Rule {
    check: Option<Box<dyn Check>>,
    verdict: Verdict,
    valid_successors: Vec<Rule>,
    invalid_successors: Vec<Rule>,
    on_valid: Option<RuleHook>,
    on_invalid: Option<RuleHook>,
    continuation: Option<RuleProvider>,
    continued: Vec<Rule>,
}

impl Rule {
    /// A rule running `check`.
    pub fn new<C>(check: C) -> Self
    where
        C: Check + 'static,
    {
        Self::with_check(Some(Box::new(check)))
    }

    /// A rule whose own check always passes. Useful as a root that only
    /// groups successors.
    pub fn noop() -> Self {
        Self::with_check(None)
    }

    /// A rule with a synchronous check closure.
    pub fn from_fn<F>(check: F) -> Self
    where
        F: Fn(&mut Verdict) + Send + Sync + 'static,
    {
        Self::new(FnCheck(check))
    }

    /// A rule that invalidates with `message` when `predicate` returns false.
    pub fn predicate<P>(message: impl Into<String>, predicate: P) -> Self
    where
        P: Fn() -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        Self::from_fn(move |verdict| {
            if !predicate() {
                verdict.invalidate(message.clone());
            }
        })
    }

    fn with_check(check: Option<Box<dyn Check>>) -> Self {
        Self {
            check,
            verdict: Verdict::new(None),
            valid_successors: Vec::new(),
            invalid_successors: Vec::new(),
            on_valid: None,
            on_invalid: None,
            continuation: None,
            continued: Vec::new(),
        }
    }

    /// Label attached to errors raised with a plain message.
    pub fn with_association(mut self, association: impl Into<String>) -> Self {
        self.verdict.set_association(Some(association.into()));
        self
    }

    /// Validate `rules` only when this rule is valid; all must pass.
    pub fn if_valid_then_validate(mut self, rules: impl Into<RuleSet>) -> Self {
        self.valid_successors.extend(rules.into().into_vec());
        self
    }

    /// Validate `rules` only when this rule is invalid; if they all pass
    /// this rule recovers.
    pub fn if_invalid_then_validate(mut self, rules: impl Into<RuleSet>) -> Self {
        self.invalid_successors.extend(rules.into().into_vec());
        self
    }

    /// Run `hook` after the check when the rule is valid.
    pub fn if_valid_then_execute<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Invocation<'static, ()> + Send + Sync + 'static,
    {
        self.on_valid = Some(Box::new(hook));
        self
    }

    /// Run `hook` after the check when the rule is invalid.
    pub fn if_invalid_then_execute<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Invocation<'static, ()> + Send + Sync + 'static,
    {
        self.on_invalid = Some(Box::new(hook));
        self
    }

    /// Fetch and validate more rules once this rule and its AND successors
    /// are valid.
    pub fn if_valid_then_get_rules<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Invocation<'static, RuleSet> + Send + Sync + 'static,
    {
        self.continuation = Some(Box::new(provider));
        self
    }

    /// Mark the rule invalid from outside a check.
    pub fn invalidate(&mut self, reason: impl Into<Invalidation>) {
        self.verdict.invalidate(reason);
    }

    pub fn is_valid(&self) -> bool {
        self.verdict.is_valid()
    }

    pub fn errors(&self) -> &[RuleError] {
        self.verdict.errors()
    }

    pub fn association(&self) -> Option<&str> {
        self.verdict.association()
    }

    pub fn valid_successors(&self) -> &[Rule] {
        &self.valid_successors
    }

    pub fn invalid_successors(&self) -> &[Rule] {
        &self.invalid_successors
    }

    /// Rules supplied by the continuation during the last validation.
    pub fn continued_rules(&self) -> &[Rule] {
        &self.continued
    }

    /// Validate with the default configuration.
    pub async fn validate(&mut self) -> Result<(), PipelineError> {
        self.validate_with(&PipelineConfig::default()).await
    }

    /// Validate with `config`.
    ///
    /// `Err` is reserved for fatal errors; a failed validation is reported
    /// through [`is_valid`](Self::is_valid) and [`errors`](Self::errors).
    /// After an `Err` the rule and every rule of the interrupted batches
    /// report invalid, with whatever errors were recorded before the abort.
    pub async fn validate_with(&mut self, config: &PipelineConfig) -> Result<(), PipelineError> {
        self.validate_at(config, 0).await
    }

    pub(crate) fn validate_at<'a>(
        &'a mut self,
        config: &'a PipelineConfig,
        depth: usize,
    ) -> BoxFuture<'a, Result<(), PipelineError>> {
        async move {
            let outcome = self.evaluate(config, depth).await;
            if outcome.is_err() {
                self.abort();
            }
            outcome
        }
        .boxed()
    }

    async fn evaluate(
        &mut self,
        config: &PipelineConfig,
        depth: usize,
    ) -> Result<(), PipelineError> {
        if depth > config.max_depth {
            return Err(PipelineError::DepthExceeded {
                limit: config.max_depth,
            });
        }

        self.verdict.reset();
        self.continued.clear();

        if let Some(check) = &self.check {
            check
                .on_validate(&mut self.verdict)
                .resolve("on_validate", config)
                .await?;
        }

        if self.verdict.is_valid() {
            self.follow_valid_path(config, depth).await?;
        } else {
            self.follow_invalid_path(config, depth).await?;
        }

        trace!(
            association = self.association().unwrap_or_default(),
            depth,
            valid = self.is_valid(),
            errors = self.errors().len(),
            "rule validated"
        );
        Ok(())
    }

    /// A fatal error interrupted validation: the rule no longer reports valid.
    pub(crate) fn abort(&mut self) {
        self.verdict.abort();
    }

    async fn follow_valid_path(
        &mut self,
        config: &PipelineConfig,
        depth: usize,
    ) -> Result<(), PipelineError> {
        if let Some(hook) = &self.on_valid {
            hook().resolve("on_valid", config).await?;
        }

        if !self.valid_successors.is_empty() {
            validate_nested(&mut self.valid_successors, config, depth + 1).await?;
            fold_failures(&mut self.verdict, &self.valid_successors);
        }

        if !self.verdict.is_valid() {
            return Ok(());
        }

        if let Some(provider) = &self.continuation {
            let rules = provider().resolve("if_valid_then_get_rules", config).await?;
            self.continued = rules.into_vec();
            validate_nested(&mut self.continued, config, depth + 1).await?;
            fold_failures(&mut self.verdict, &self.continued);
        }
        Ok(())
    }

    async fn follow_invalid_path(
        &mut self,
        config: &PipelineConfig,
        depth: usize,
    ) -> Result<(), PipelineError> {
        if let Some(hook) = &self.on_invalid {
            hook().resolve("on_invalid", config).await?;
        }

        if self.invalid_successors.is_empty() {
            return Ok(());
        }

        validate_nested(&mut self.invalid_successors, config, depth + 1).await?;
        match collect_errors(&self.invalid_successors) {
            Validation::Success(_) => self.verdict.recover(),
            Validation::Failure(errors) => self.verdict.adopt(errors.iter().cloned().collect()),
        }
        Ok(())
    }
}

/// AND folding: any failed rule hands its errors to the parent.
fn fold_failures(verdict: &mut Verdict, rules: &[Rule]) {
    if let Validation::Failure(errors) = collect_errors(rules) {
        verdict.adopt(errors.iter().cloned().collect());
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("association", &self.association())
            .field("valid", &self.is_valid())
            .field("errors", &self.errors())
            .field("valid_successors", &self.valid_successors)
            .field("invalid_successors", &self.invalid_successors)
            .field("has_continuation", &self.continuation.is_some())
            .finish()
    }
}
