use std::time::Duration;
use thiserror::Error;

/// Failure talking to a counter backend (connection or command error).
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("rate-limit backend connection failed: {0}")]
    Connection(String),
    #[error("rate-limit backend operation failed: {0}")]
    Operation(String),
}

/// Outcome of a rejected admission check.
#[derive(Debug, Clone, Error)]
#[error("rate limit exceeded, retry after {retry_after:?}")]
pub struct RateLimitExceeded {
    pub retry_after: Duration,
}
