//! Error types for the worker pool.

use thiserror::Error;
use ytsize_core::CoreErrorCode;

#[derive(Debug, Clone, Error)]
pub enum WorkerPoolError {
    /// The bounded queue is full and at `maxWorkers`; no admission possible.
    #[error("worker pool queue is full: max queue size ({max_queue_size}) reached")]
    QueueFull { max_queue_size: usize },

    /// The pool has begun draining (`shutdown()` was called) and rejects
    /// new admissions while letting in-flight tasks finish.
    #[error("worker pool is shutting down")]
    ShuttingDown,

    /// A task exceeded the pool's own deadline (the per-task subprocess
    /// timeout plus the pool's buffer) without the worker reporting back.
    #[error("task exceeded the worker pool deadline")]
    TaskTimeout,

    /// The worker executing this task exited unexpectedly before reporting
    /// a result (e.g. panicked mid-task).
    #[error("worker failed before completing the task")]
    WorkerCrashed,
}

impl WorkerPoolError {
    pub fn code(&self) -> CoreErrorCode {
        match self {
            WorkerPoolError::QueueFull { .. } => CoreErrorCode::QueueFull,
            WorkerPoolError::ShuttingDown => CoreErrorCode::ShuttingDown,
            WorkerPoolError::TaskTimeout => CoreErrorCode::Timeout,
            WorkerPoolError::WorkerCrashed => CoreErrorCode::WorkerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_match_taxonomy() {
        assert_eq!(
            WorkerPoolError::QueueFull { max_queue_size: 10 }.code(),
            CoreErrorCode::QueueFull
        );
        assert_eq!(WorkerPoolError::ShuttingDown.code(), CoreErrorCode::ShuttingDown);
        assert_eq!(WorkerPoolError::TaskTimeout.code(), CoreErrorCode::Timeout);
        assert_eq!(WorkerPoolError::WorkerCrashed.code(), CoreErrorCode::WorkerError);
    }
}
