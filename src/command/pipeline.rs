//! Command pipeline: initialize, discover rules, validate, execute.

use super::context::Context;
use crate::config::PipelineConfig;
use crate::core::{ExecutionResult, RuleError};
use crate::effects::{Invocation, PipelineError};
use crate::rules::{collect_errors, flatten_errors, validate_all, Rule, RuleSet};
use futures::future::{BoxFuture, FutureExt};
use stillwater::validation::Validation;
use tracing::{debug, debug_span, Instrument};

/// Hooks a command runs, with the bound arguments living on `self`.
///
/// Every hook receives the run's [`Context`]. Only
/// `on_validation_success` is required; the other two default to doing
/// nothing and to discovering no rules.
///
/// # Example
///
/// ```rust
/// use rulebook::{Command, CommandHooks, Context, Invocation, Rule, RuleSet};
///
/// struct Rename {
///     name: String,
/// }
///
/// impl CommandHooks for Rename {
///     type Output = String;
///
///     fn get_rules<'a>(&'a self, _context: &'a mut Context) -> Invocation<'a, RuleSet> {
///         let present = !self.name.is_empty();
///         Invocation::ready(Ok(Rule::predicate("name not supplied", move || present)
///             .with_association("name")
///             .into()))
///     }
///
///     fn on_validation_success<'a>(&'a self, _context: &'a mut Context) -> Invocation<'a, String> {
///         Invocation::future(async move { Ok(self.name.to_uppercase()) })
///     }
/// }
///
/// # futures::executor::block_on(async {
/// let result = Command::new(Rename { name: "ada".into() }).execute().await.unwrap();
/// assert_eq!(result.value().map(String::as_str), Some("ADA"));
///
/// let result = Command::new(Rename { name: String::new() }).execute().await.unwrap();
/// assert_eq!(result.errors().unwrap()[0].message, "name not supplied");
/// # });
/// ```
pub trait CommandHooks: Send + Sync {
    type Output: Send;

    fn on_initialization<'a>(&'a self, _context: &'a mut Context) -> Invocation<'a, ()> {
        Invocation::ready(Ok(()))
    }

    fn get_rules<'a>(&'a self, _context: &'a mut Context) -> Invocation<'a, RuleSet> {
        Invocation::ready(Ok(RuleSet::default()))
    }

    /// Business logic, run only when every discovered rule passed.
    ///
    /// Failing with [`PipelineError::Service`] produces a failed result;
    /// any other error is returned to the caller of `execute`.
    fn on_validation_success<'a>(
        &'a self,
        context: &'a mut Context,
    ) -> Invocation<'a, Self::Output>;
}

/// Stages of one pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Created,
    Initializing,
    DiscoveringRules,
    Validating,
    ComputingResult,
    BuildingFailureResult,
    Completed,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Initializing => "Initializing",
            Self::DiscoveringRules => "DiscoveringRules",
            Self::Validating => "Validating",
            Self::ComputingResult => "ComputingResult",
            Self::BuildingFailureResult => "BuildingFailureResult",
            Self::Completed => "Completed",
        }
    }
}

fn enter(stage: Stage) {
    debug!(stage = stage.name(), "command stage");
}

/// A configured run of the initialize → discover → validate → execute
/// pipeline.
pub struct Command<H> {
    hooks: H,
    config: PipelineConfig,
}

impl<H: CommandHooks> Command<H> {
    pub fn new(hooks: H) -> Self {
        Self {
            hooks,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline.
    ///
    /// Expected failures (invalid rules, a service exception from business
    /// logic) come back as a failed [`ExecutionResult`]; `Err` means a hook
    /// failed unexpectedly.
    pub async fn execute(&self) -> Result<ExecutionResult<H::Output>, PipelineError> {
        let mut context = Context::new();
        let span = debug_span!("command", run_id = %context.run_id(), mode = "execute");
        self.run(&mut context).instrument(span).await
    }

    /// Only discover and validate rules, returning their errors.
    ///
    /// Neither `on_initialization` nor `on_validation_success` is invoked.
    pub async fn get_errors(&self) -> Result<Vec<RuleError>, PipelineError> {
        let mut context = Context::new();
        let span = debug_span!("command", run_id = %context.run_id(), mode = "get_errors");
        async {
            let mut rules = self.discover(&mut context).await?;
            enter(Stage::Validating);
            validate_all(&mut rules, &self.config).await?;
            enter(Stage::Completed);
            Ok::<_, PipelineError>(flatten_errors(&rules))
        }
        .instrument(span)
        .await
    }

    /// Only invoke `get_rules`, with a fresh context.
    pub async fn discover_rules(&self) -> Result<Vec<Rule>, PipelineError> {
        let mut context = Context::new();
        let span = debug_span!("command", run_id = %context.run_id(), mode = "discover");
        self.discover(&mut context).instrument(span).await
    }

    async fn discover(&self, context: &mut Context) -> Result<Vec<Rule>, PipelineError> {
        enter(Stage::DiscoveringRules);
        let rules = self
            .hooks
            .get_rules(context)
            .resolve("get_rules", &self.config)
            .await?
            .into_vec();
        debug!(rules = rules.len(), "rules discovered");
        Ok(rules)
    }

    async fn run(&self, context: &mut Context) -> Result<ExecutionResult<H::Output>, PipelineError> {
        enter(Stage::Created);

        enter(Stage::Initializing);
        self.hooks
            .on_initialization(context)
            .resolve("on_initialization", &self.config)
            .await?;

        let mut rules = self.discover(context).await?;

        enter(Stage::Validating);
        validate_all(&mut rules, &self.config).await?;

        let result = match collect_errors(&rules) {
            Validation::Failure(errors) => {
                enter(Stage::BuildingFailureResult);
                ExecutionResult::failure(errors.iter().cloned().collect())?
            }
            Validation::Success(_) => {
                enter(Stage::ComputingResult);
                self.compute(context).await?
            }
        };

        enter(Stage::Completed);
        debug!(
            success = result.is_success(),
            elapsed_ms = context.elapsed().as_millis() as u64,
            "command completed"
        );
        Ok(result)
    }

    async fn compute(
        &self,
        context: &mut Context,
    ) -> Result<ExecutionResult<H::Output>, PipelineError> {
        let outcome = self
            .hooks
            .on_validation_success(context)
            .resolve("on_validation_success", &self.config)
            .await;

        match outcome {
            Ok(value) => Ok(ExecutionResult::success(value)),
            Err(PipelineError::Service(exception)) => {
                debug!(error = %exception, "service exception converted to failure");
                Ok(exception.into())
            }
            Err(error) => Err(error),
        }
    }
}

/// Object-safe view of a command, so commands of different types can run
/// together.
pub trait Executable: Send + Sync {
    type Output: Send;

    fn execute(&self) -> BoxFuture<'_, Result<ExecutionResult<Self::Output>, PipelineError>>;

    fn get_errors(&self) -> BoxFuture<'_, Result<Vec<RuleError>, PipelineError>>;

    fn discover_rules(&self) -> BoxFuture<'_, Result<Vec<Rule>, PipelineError>>;
}

impl<H: CommandHooks> Executable for Command<H> {
    type Output = H::Output;

    fn execute(&self) -> BoxFuture<'_, Result<ExecutionResult<Self::Output>, PipelineError>> {
        Command::execute(self).boxed()
    }

    fn get_errors(&self) -> BoxFuture<'_, Result<Vec<RuleError>, PipelineError>> {
        Command::get_errors(self).boxed()
    }

    fn discover_rules(&self) -> BoxFuture<'_, Result<Vec<Rule>, PipelineError>> {
        Command::discover_rules(self).boxed()
    }
}

impl<E: Executable + ?Sized> Executable for Box<E> {
    type Output = E::Output;

    fn execute(&self) -> BoxFuture<'_, Result<ExecutionResult<Self::Output>, PipelineError>> {
        (**self).execute()
    }

    fn get_errors(&self) -> BoxFuture<'_, Result<Vec<RuleError>, PipelineError>> {
        (**self).get_errors()
    }

    fn discover_rules(&self) -> BoxFuture<'_, Result<Vec<Rule>, PipelineError>> {
        (**self).discover_rules()
    }
}
