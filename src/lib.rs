//! Rulebook: composable business rules and a uniform command pipeline
//!
//! Validation is expressed as a tree of rules. Each rule runs its own check
//! and then, depending on the outcome, its AND successors, its OR
//! alternatives or a continuation that fetches more rules. Commands collect
//! such rules, validate them and only then run business logic, always
//! producing the same [`ExecutionResult`] shape.
//!
//! # Core Concepts
//!
//! - **Rule**: a check plus conditional successors, see [`Rule`]
//! - **Command**: initialize → discover rules → validate → execute, see [`Command`]
//! - **Invocation**: how a hook answers (future, completion callback or plain
//!   value), see [`Invocation`]
//! - **Errors**: rule errors and service exceptions are expected outcomes;
//!   everything else is a fatal [`PipelineError`]
//!
//! # Example
//!
//! ```rust
//! use rulebook::{
//!     Command, CommandHooks, Context, Invocation, PipelineError, Rule, RuleSet, ServiceException,
//! };
//!
//! struct PlaceOrder {
//!     quantity: u32,
//!     in_stock: u32,
//! }
//!
//! impl CommandHooks for PlaceOrder {
//!     type Output = u32;
//!
//!     fn get_rules<'a>(&'a self, _context: &'a mut Context) -> Invocation<'a, RuleSet> {
//!         let quantity = self.quantity;
//!         let rules = vec![
//!             Rule::predicate("quantity must be positive", move || quantity > 0)
//!                 .with_association("quantity"),
//!         ];
//!         Invocation::ready(Ok(rules.into()))
//!     }
//!
//!     fn on_validation_success<'a>(&'a self, _context: &'a mut Context) -> Invocation<'a, u32> {
//!         Invocation::future(async move {
//!             if self.quantity > self.in_stock {
//!                 let exception = ServiceException::new("insufficient stock");
//!                 return Err(PipelineError::from(exception));
//!             }
//!             Ok(self.in_stock - self.quantity)
//!         })
//!     }
//! }
//!
//! # futures::executor::block_on(async {
//! let result = Command::new(PlaceOrder { quantity: 2, in_stock: 5 }).execute().await.unwrap();
//! assert_eq!(result.value(), Some(&3));
//!
//! let result = Command::new(PlaceOrder { quantity: 9, in_stock: 5 }).execute().await.unwrap();
//! assert_eq!(result.errors().unwrap()[0].message, "insufficient stock");
//! # });
//! ```

pub mod command;
pub mod config;
pub mod core;
pub mod effects;
pub mod rules;

// Re-export commonly used types
pub use command::{execute_all, BatchError, Command, CommandHooks, Context, Executable, Stage};
pub use config::PipelineConfig;
pub use crate::core::{ExecutionResult, RuleError, ServiceException};
pub use effects::{Completion, Invocation, PipelineError};
pub use rules::{
    collect_errors, flatten_errors, get_all_rules_from, if_all_valid, validate_all, AllValid,
    Check, Invalidation, Rule, RuleSet, Verdict,
};
