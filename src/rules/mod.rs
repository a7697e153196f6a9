//! Rule trees with AND/OR chaining.
//!
//! A [`Rule`] runs its own [`Check`] and then, depending on the outcome,
//! its AND successors (`if_valid_then_validate`), its OR successors
//! (`if_invalid_then_validate`) and an optional continuation
//! (`if_valid_then_get_rules`). Sibling rules are validated as a batch and
//! their errors accumulated in declaration order.
//!
//! # Example
//!
//! ```rust
//! use rulebook::Rule;
//!
//! # futures::executor::block_on(async {
//! // Either an email or a phone number is enough.
//! let mut contact = Rule::predicate("email missing", || false)
//!     .with_association("contact")
//!     .if_invalid_then_validate(Rule::predicate("phone missing", || true));
//!
//! contact.validate().await.unwrap();
//! assert!(contact.is_valid());
//! # });
//! ```

mod batch;
mod check;
mod compose;
mod rule;

pub use batch::{collect_errors, flatten_errors, validate_all};
pub use check::{Check, Invalidation, Verdict};
pub use compose::{get_all_rules_from, if_all_valid, AllValid};
pub use rule::{Rule, RuleHook, RuleProvider, RuleSet};
