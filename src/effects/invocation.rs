//! Invocation adapter: one awaitable outcome for every hook protocol.
//!
//! Hooks answer with an [`Invocation`], whose variant names the protocol the
//! hook speaks. [`Invocation::resolve`] turns any of them into a single
//! `Result`, so validation and command code never branch on how a hook was
//! written.

use crate::config::PipelineConfig;
use crate::effects::error::PipelineError;
use futures::channel::oneshot;
use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;

/// Starter of a completion-style hook.
///
/// It receives the [`Completion`] handle and may fail synchronously; that
/// failure joins the same channel as a failed completion.
pub type CompletionStart<'a, T> =
    Box<dyn FnOnce(Completion<T>) -> Result<(), PipelineError> + Send + 'a>;

/// What a hook hands back to the pipeline.
#[must_use = "an invocation does nothing until it is resolved"]
pub enum Invocation<'a, T> {
    /// Native future. The normal protocol.
    Future(BoxFuture<'a, Result<T, PipelineError>>),

    /// Legacy completion-callback protocol.
    Completion(CompletionStart<'a, T>),

    /// Plain return computed synchronously. `Ok` values are only accepted
    /// when auto-wrap is configured; `Err` is always delivered.
    Value(Result<T, PipelineError>),
}

impl<'a, T: Send + 'a> Invocation<'a, T> {
    /// Wrap a future.
    pub fn future<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, PipelineError>> + Send + 'a,
    {
        Invocation::Future(fut.boxed())
    }

    /// An already resolved future. Unlike [`value`](Self::value) this does
    /// not depend on auto-wrap.
    pub fn ready(result: Result<T, PipelineError>) -> Self {
        Invocation::Future(future::ready(result).boxed())
    }

    /// Completion-callback protocol.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rulebook::{Invocation, PipelineConfig};
    ///
    /// # futures::executor::block_on(async {
    /// let invocation: Invocation<'_, u32> = Invocation::completion(|done| {
    ///     std::thread::spawn(move || done.succeed(7));
    ///     Ok(())
    /// });
    ///
    /// let value = invocation.resolve("lookup", &PipelineConfig::default()).await.unwrap();
    /// assert_eq!(value, 7);
    /// # });
    /// ```
    pub fn completion<F>(start: F) -> Self
    where
        F: FnOnce(Completion<T>) -> Result<(), PipelineError> + Send + 'a,
    {
        Invocation::Completion(Box::new(start))
    }

    /// Plain value; subject to auto-wrap.
    pub fn value(value: T) -> Self {
        Invocation::Value(Ok(value))
    }

    /// Synchronous failure.
    pub fn failed(error: impl Into<PipelineError>) -> Self {
        Invocation::Value(Err(error.into()))
    }

    /// Drive the invocation to its outcome.
    ///
    /// `hook` names the hook in error messages.
    pub async fn resolve(
        self,
        hook: &'static str,
        config: &PipelineConfig,
    ) -> Result<T, PipelineError> {
        match self {
            Invocation::Future(fut) => fut.await,
            Invocation::Completion(start) => {
                let (sender, receiver) = oneshot::channel();
                start(Completion { sender })?;
                receiver
                    .await
                    .map_err(|_| PipelineError::CompletionDropped { hook })?
            }
            Invocation::Value(Err(error)) => Err(error),
            Invocation::Value(Ok(value)) if config.auto_wrap => Ok(value),
            Invocation::Value(Ok(_)) => Err(PipelineError::NotAwaitable { hook }),
        }
    }
}

impl<'a, T: Send + 'a> From<Result<T, PipelineError>> for Invocation<'a, T> {
    fn from(result: Result<T, PipelineError>) -> Self {
        Invocation::Value(result)
    }
}

impl<T> fmt::Debug for Invocation<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let protocol = match self {
            Invocation::Future(_) => "Future",
            Invocation::Completion(_) => "Completion",
            Invocation::Value(_) => "Value",
        };
        f.debug_tuple("Invocation").field(&protocol).finish()
    }
}

/// Handle a completion-style hook calls exactly once to report its outcome.
pub struct Completion<T> {
    sender: oneshot::Sender<Result<T, PipelineError>>,
}

impl<T> Completion<T> {
    pub fn complete(self, result: Result<T, PipelineError>) {
        // The receiver only goes away when the run was dropped.
        let _ = self.sender.send(result);
    }

    pub fn succeed(self, value: T) {
        self.complete(Ok(value));
    }

    pub fn fail(self, error: impl Into<PipelineError>) {
        self.complete(Err(error.into()));
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}
