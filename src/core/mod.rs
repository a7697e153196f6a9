//! Core data carried through validation and execution.
//!
//! This module contains the passive types of the crate:
//! - `RuleError`, recorded whenever a rule invalidates
//! - `ServiceException`, raised by business logic for expected failures
//! - `ExecutionResult`, the uniform outcome of a command run
//!
//! Nothing here performs I/O or invokes hooks.

mod error;
mod result;

pub use error::{RuleError, ServiceException};
pub use result::ExecutionResult;
