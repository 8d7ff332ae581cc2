//! One extraction request as it flows through the pool.

use std::time::Duration;
use tokio::sync::oneshot;
use ytsize_executor::{ExecutorError, ExecutorOutput};

pub type TaskResult = Result<ExecutorOutput, ExecutorError>;

/// A queued/dispatched unit of work. Dropping the [`oneshot::Receiver`]
/// returned by [`Task::new`] before the task is dispatched (e.g. a client
/// disconnect while the task still sits in the FIFO queue) is how callers
/// cancel queued-but-not-yet-running work; a task already handed to a
/// worker runs to completion regardless.
pub struct Task {
    pub url: String,
    pub timeout: Duration,
    pub max_output_bytes: usize,
    pub cookies: Option<String>,
    pub retry_attempt: u32,
    pub(crate) completion: oneshot::Sender<TaskResult>,
}

impl Task {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        max_output_bytes: usize,
        cookies: Option<String>,
    ) -> (Self, oneshot::Receiver<TaskResult>) {
        let (completion, receiver) = oneshot::channel();
        (
            Self {
                url: url.into(),
                timeout,
                max_output_bytes,
                cookies,
                retry_attempt: 0,
                completion,
            },
            receiver,
        )
    }

    /// Resolves the caller's completion handle. A caller that has already
    /// dropped its receiver (cancelled) is simply a no-op send failure.
    pub fn complete(self, result: TaskResult) {
        let _ = self.completion.send(result);
    }
}
