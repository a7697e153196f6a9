//! Batch validation of sibling rules.
//!
//! Siblings are validated concurrently on the calling task. Errors are
//! collected afterwards by walking the list in declaration order, so the
//! aggregate never depends on which sibling settled first.

use super::rule::Rule;
use crate::config::PipelineConfig;
use crate::core::RuleError;
use crate::effects::PipelineError;
use futures::future::try_join_all;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Validate every rule in `rules` concurrently.
///
/// Completes once all rules have settled. The first fatal error aborts the
/// batch; the remaining validations are dropped.
pub async fn validate_all(
    rules: &mut [Rule],
    config: &PipelineConfig,
) -> Result<(), PipelineError> {
    validate_nested(rules, config, 0).await
}

pub(crate) async fn validate_nested(
    rules: &mut [Rule],
    config: &PipelineConfig,
    depth: usize,
) -> Result<(), PipelineError> {
    if rules.is_empty() {
        return Ok(());
    }
    let outcome =
        try_join_all(rules.iter_mut().map(|rule| rule.validate_at(config, depth))).await;
    if outcome.is_err() {
        // Cancelled siblings never finished either.
        rules.iter_mut().for_each(Rule::abort);
    }
    outcome.map(|_| ())
}

/// Accumulate the errors of every invalid rule, in declaration order.
pub fn collect_errors(rules: &[Rule]) -> Validation<(), NonEmptyVec<RuleError>> {
    let checks: Vec<Validation<(), NonEmptyVec<RuleError>>> = rules
        .iter()
        .filter(|rule| !rule.is_valid())
        .flat_map(|rule| rule.errors().iter().cloned())
        .map(Validation::fail)
        .collect();

    Validation::all_vec(checks).map(|_| ())
}

/// Flattened errors of every invalid rule, in declaration order.
pub fn flatten_errors(rules: &[Rule]) -> Vec<RuleError> {
    match collect_errors(rules) {
        Validation::Failure(errors) => errors.iter().cloned().collect(),
        Validation::Success(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Invocation;
    use crate::rules::{Check, Verdict};
    use std::time::Duration;

    /// Fails with `message` after `delay`.
    struct SlowFailure {
        message: &'static str,
        delay: Duration,
    }

    impl Check for SlowFailure {
        fn on_validate<'a>(&'a self, verdict: &'a mut Verdict) -> Invocation<'a, ()> {
            Invocation::future(async move {
                tokio::time::sleep(self.delay).await;
                verdict.invalidate(self.message);
                Ok(())
            })
        }
    }

    struct Explodes;

    impl Check for Explodes {
        fn on_validate<'a>(&'a self, _verdict: &'a mut Verdict) -> Invocation<'a, ()> {
            Invocation::ready(Err(PipelineError::hook("check exploded")))
        }
    }

    fn slow(message: &'static str, millis: u64) -> Rule {
        Rule::new(SlowFailure {
            message,
            delay: Duration::from_millis(millis),
        })
    }

    #[tokio::test]
    async fn errors_follow_declaration_order() {
        let mut rules = vec![slow("first", 40), Rule::noop(), slow("second", 0)];

        validate_all(&mut rules, &PipelineConfig::default())
            .await
            .unwrap();

        assert_eq!(
            flatten_errors(&rules),
            vec![RuleError::new("first"), RuleError::new("second")]
        );
    }

    #[tokio::test]
    async fn siblings_run_concurrently() {
        let mut rules = vec![slow("a", 50), slow("b", 50), slow("c", 50)];

        let started = std::time::Instant::now();
        validate_all(&mut rules, &PipelineConfig::default())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_millis(140));
        assert_eq!(flatten_errors(&rules).len(), 3);
    }

    #[tokio::test]
    async fn fatal_error_aborts_batch() {
        let mut rules = vec![slow("slow", 20), Rule::new(Explodes)];

        let error = validate_all(&mut rules, &PipelineConfig::default())
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "check exploded");
    }

    #[tokio::test]
    async fn aborted_batch_leaves_no_rule_valid() {
        let mut rules = vec![slow("slow", 20), Rule::new(Explodes), Rule::noop()];

        validate_all(&mut rules, &PipelineConfig::default())
            .await
            .unwrap_err();

        assert!(rules.iter().all(|rule| !rule.is_valid()));
    }

    #[tokio::test]
    async fn empty_batch_is_valid() {
        let mut rules: Vec<Rule> = Vec::new();
        validate_all(&mut rules, &PipelineConfig::default())
            .await
            .unwrap();

        assert!(collect_errors(&rules).is_success());
    }

    #[test]
    fn collect_errors_accumulates_all_failures() {
        let mut first = Rule::noop();
        first.invalidate("a");
        let mut second = Rule::noop();
        second.invalidate(vec![RuleError::new("b"), RuleError::new("c")]);

        match collect_errors(&[first, Rule::noop(), second]) {
            Validation::Failure(errors) => {
                let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
                assert_eq!(messages, vec!["a", "b", "c"]);
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }
}
