//! Running several commands at once.

use super::pipeline::Executable;
use crate::core::ExecutionResult;
use crate::effects::PipelineError;
use futures::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tracing::{debug, warn};

/// A command inside [`execute_all`] failed fatally.
///
/// `completed` is indexed like the input: `Some` for runs that finished
/// before the failure, `None` for the failed run and for runs that were
/// cancelled.
#[derive(Debug, Error)]
#[error("command {index} failed: {source}")]
pub struct BatchError<T> {
    pub index: usize,
    pub source: PipelineError,
    pub completed: Vec<Option<ExecutionResult<T>>>,
}

impl<T> BatchError<T> {
    pub fn into_source(self) -> PipelineError {
        self.source
    }
}

/// Execute every command concurrently, returning results in input order.
///
/// With no commands this resolves immediately. The first fatal error
/// cancels the runs still in flight and is returned together with the
/// results gathered so far.
pub async fn execute_all<C>(
    commands: &[C],
) -> Result<Vec<ExecutionResult<C::Output>>, BatchError<C::Output>>
where
    C: Executable,
{
    if commands.is_empty() {
        return Ok(Vec::new());
    }

    let mut completed: Vec<Option<ExecutionResult<C::Output>>> =
        commands.iter().map(|_| None).collect();

    let mut pending: FuturesUnordered<_> = commands
        .iter()
        .enumerate()
        .map(|(index, command)| async move { (index, command.execute().await) })
        .collect();

    while let Some((index, outcome)) = pending.next().await {
        match outcome {
            Ok(result) => {
                debug!(index, success = result.is_success(), "command settled");
                completed[index] = Some(result);
            }
            Err(source) => {
                warn!(
                    index,
                    error = %source,
                    in_flight = pending.len(),
                    "command failed, cancelling batch"
                );
                return Err(BatchError {
                    index,
                    source,
                    completed,
                });
            }
        }
    }

    Ok(completed.into_iter().flatten().collect())
}
