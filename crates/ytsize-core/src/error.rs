//! The fixed error-code taxonomy shared by every layer of the core.
//! `ytsize-executor` originates these codes; `ytsize-workerpool`
//! and `ytsize-circuitbreaker` forward them unchanged, only adding the few
//! codes that originate at their own layer (`Timeout` for a queue deadline,
//! `WorkerError` for a crashed worker, `CircuitOpen` for a synthesized
//! rejection). Collapsing the taxonomy into one enum here means no layer
//! needs its own parallel classification of the same failure.

use std::fmt;

/// Stable, cross-version error codes. Never renamed once shipped — callers
/// (including the browser extension, out of scope here) pattern-match on
/// the `Display` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreErrorCode {
    InvalidUrl,
    Validation,
    Timeout,
    NotFound,
    NetworkError,
    RateLimited,
    VideoUnavailable,
    CircuitOpen,
    QueueFull,
    ShuttingDown,
    WorkerError,
    Unknown,
}

impl CoreErrorCode {
    /// The four codes that trip the circuit breaker's fast path after 3
    /// consecutive occurrences, regardless of the volume threshold.
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            CoreErrorCode::Timeout
                | CoreErrorCode::NotFound
                | CoreErrorCode::RateLimited
                | CoreErrorCode::NetworkError
        )
    }

    /// Transient codes eligible for the bounded in-request retry.
    pub fn is_retryable(self) -> bool {
        matches!(self, CoreErrorCode::NetworkError | CoreErrorCode::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CoreErrorCode::InvalidUrl => "INVALID_URL",
            CoreErrorCode::Validation => "VALIDATION",
            CoreErrorCode::Timeout => "TIMEOUT",
            CoreErrorCode::NotFound => "NOT_FOUND",
            CoreErrorCode::NetworkError => "NETWORK_ERROR",
            CoreErrorCode::RateLimited => "RATE_LIMITED",
            CoreErrorCode::VideoUnavailable => "VIDEO_UNAVAILABLE",
            CoreErrorCode::CircuitOpen => "CIRCUIT_OPEN",
            CoreErrorCode::QueueFull => "QUEUE_FULL",
            CoreErrorCode::ShuttingDown => "SHUTTING_DOWN",
            CoreErrorCode::WorkerError => "WORKER_ERROR",
            CoreErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
