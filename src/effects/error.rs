//! Errors surfaced by hooks and by the pipeline itself.

use crate::core::ServiceException;
use std::error::Error as StdError;
use thiserror::Error;

/// Boxed application error carried through the pipeline untouched.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Everything that can end a validation or a command run other than a
/// failed [`ExecutionResult`](crate::ExecutionResult).
///
/// Only [`PipelineError::Service`] raised from `on_validation_success` is
/// recovered by the pipeline. Every other variant reaches the caller as is.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("service exception: {0}")]
    Service(#[from] ServiceException),

    #[error("{0}")]
    Hook(#[source] BoxError),

    #[error("hook '{hook}' returned a plain value but auto-wrap is disabled")]
    NotAwaitable { hook: &'static str },

    #[error("hook '{hook}' dropped its completion handle without completing")]
    CompletionDropped { hook: &'static str },

    #[error("rule nesting exceeded the configured depth of {limit}")]
    DepthExceeded { limit: usize },

    #[error("a failed result needs at least one rule error")]
    EmptyFailure,

    #[error("context value '{key}' could not be converted: {source}")]
    ContextValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PipelineError {
    /// Wrap an application error raised inside a hook.
    pub fn hook<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        PipelineError::Hook(error.into())
    }

    /// The application error, when this is a [`PipelineError::Hook`] of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match self {
            PipelineError::Hook(error) => error.downcast_ref::<E>(),
            _ => None,
        }
    }

    pub fn is_service_exception(&self) -> bool {
        matches!(self, PipelineError::Service(_))
    }
}
