//! Composition helpers over groups of rules and commands.

use super::rule::{Rule, RuleSet};
use crate::command::Executable;
use crate::effects::{Invocation, PipelineError};
use futures::future::try_join_all;

/// Start an "all of these, then more" composition.
///
/// # Example
///
/// ```rust
/// use rulebook::{if_all_valid, Invocation, Rule};
///
/// # futures::executor::block_on(async {
/// let mut root = if_all_valid(vec![Rule::noop(), Rule::noop()]).then_get_rules(|| {
///     Invocation::ready(Ok(Rule::predicate("stock reserved", || false).into()))
/// });
///
/// root.validate().await.unwrap();
/// assert_eq!(root.errors()[0].message, "stock reserved");
/// # });
/// ```
pub fn if_all_valid(rules: impl Into<RuleSet>) -> AllValid {
    AllValid {
        rules: rules.into().into_vec(),
    }
}

/// Rules that must all pass before a provider is consulted.
#[derive(Debug)]
#[must_use = "call then_get_rules to build the rule"]
pub struct AllValid {
    rules: Vec<Rule>,
}

impl AllValid {
    /// Finish the composition into a synthetic root rule.
    pub fn then_get_rules<F>(self, provider: F) -> Rule
    where
        F: Fn() -> Invocation<'static, RuleSet> + Send + Sync + 'static,
    {
        Rule::noop()
            .if_valid_then_validate(self.rules)
            .if_valid_then_get_rules(provider)
    }
}

impl Rule {
    /// See [`if_all_valid`].
    pub fn if_all_valid(rules: impl Into<RuleSet>) -> AllValid {
        if_all_valid(rules)
    }
}

/// Collect the rules every command would validate, without running any of
/// their initialization or business logic.
///
/// Each command discovers its rules with its own fresh context; the results
/// are flattened in input order.
pub async fn get_all_rules_from<C>(commands: &[C]) -> Result<Vec<Rule>, PipelineError>
where
    C: Executable,
{
    let discovered = try_join_all(commands.iter().map(|command| command.discover_rules())).await?;
    Ok(discovered.into_iter().flatten().collect())
}
