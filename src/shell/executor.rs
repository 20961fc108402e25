use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::error::{TileError, TileResult, exit_code_to_string};
use crate::shell::{ShellBackend, ShellOutput};

/// Result of one submitted command, delivered back to the submitter
#[derive(Debug)]
pub struct Completion<T> {
    pub tag: T,
    pub command: String,
    pub result: TileResult<ShellOutput>,
}

impl<T> Completion<T> {
    /// Ran, and exited with status 0
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(output) if output.is_success())
    }
}

struct Job<T> {
    tag: T,
    command: String,
}

/// Serialized background runner for privileged commands.
///
/// `submit` never blocks: jobs are queued to a single worker task which runs
/// them one after another on the blocking pool and reports each outcome on
/// the completion channel. Submitted jobs are never cancelled. Dropping the
/// executor does not wait for them: the worker keeps running the queue in the
/// background and exits once it is empty.
pub struct CommandExecutor<T> {
    jobs: UnboundedSender<Job<T>>,
}

impl<T: Send + 'static> CommandExecutor<T> {
    pub fn spawn(shell: Arc<dyn ShellBackend>, completions: UnboundedSender<Completion<T>>) -> Self {
        let (jobs, mut queue) = mpsc::unbounded_channel::<Job<T>>();

        tokio::spawn(async move {
            while let Some(Job { tag, command }) = queue.recv().await {
                let backend = Arc::clone(&shell);
                let line = command.clone();
                let result = tokio::task::spawn_blocking(move || backend.run(&line))
                    .await
                    .unwrap_or_else(|e| Err(TileError::Internal(e.to_string())));

                match &result {
                    Ok(output) if output.is_success() => debug!("`{command}` succeeded"),
                    Ok(output) => warn!(
                        "`{command}` exited with {} ({})",
                        output.code,
                        exit_code_to_string(output.code)
                    ),
                    Err(e) if e.is_access_denied() => warn!("`{command}` refused: {e}"),
                    Err(e) => warn!("`{command}` could not run: {e}"),
                }

                if completions
                    .send(Completion {
                        tag,
                        command,
                        result,
                    })
                    .is_err()
                {
                    debug!("Completion receiver dropped, discarding outcome");
                }
            }
            debug!("Command queue closed, worker exiting");
        });

        Self { jobs }
    }

    pub fn submit(&self, tag: T, command: impl Into<String>) {
        let command = command.into();
        debug!("Queueing `{command}`");
        if self.jobs.send(Job { tag, command }).is_err() {
            warn!("Command worker has stopped; dropping job");
        }
    }
}
