//! The imperative shell: how hooks are invoked and how they fail.
//!
//! Rules and commands never call application code directly. Every hook
//! answers with an [`Invocation`], and the pipeline resolves it against the
//! active [`PipelineConfig`](crate::PipelineConfig).
//!
//! # Protocols
//!
//! - **Future**: `Invocation::future(async { .. })`, the native protocol
//! - **Completion**: `Invocation::completion(|done| { .. })`, for collaborators
//!   that report through a callback
//! - **Value**: `Invocation::value(v)`, a plain return accepted only with
//!   auto-wrap enabled

mod error;
mod invocation;

pub use error::{BoxError, PipelineError};
pub use invocation::{Completion, CompletionStart, Invocation};
