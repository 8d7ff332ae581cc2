//! Executor-local error type. Wraps [`ytsize_core::CoreErrorCode`] with the
//! extra context (a stderr excerpt) the HTTP handler's error body wants,
//! while keeping the code itself as the single source of truth other layers
//! pattern-match on.

use thiserror::Error;
use ytsize_core::CoreErrorCode;

#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct ExecutorError {
    pub code: CoreErrorCode,
    pub message: String,
    pub stderr_excerpt: Option<String>,
}

impl ExecutorError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            stderr_excerpt: None,
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr_excerpt = Some(stderr.into());
        self
    }
}
