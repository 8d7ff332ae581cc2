//! Subprocess executor (SE): invokes `yt-dlp` as a child process, enforces
//! the timeout and output-byte cap, and classifies failures into the fixed
//! [`ytsize_core::CoreErrorCode`] taxonomy.
//!
//! `classifier.rs` is the single place stderr/exit-code classification
//! happens; the worker pool and circuit breaker only ever pattern-match on
//! the resulting [`CoreErrorCode`], never re-deriving one from raw output.

pub mod classifier;
pub mod config;
pub mod error;
pub mod executor;

pub use classifier::{classify_exit, classify_spawn_error};
pub use config::{SubprocessConfig, SubprocessConfigBuilder};
pub use error::ExecutorError;
pub use executor::{ExecuteRequest, ExecutorOutput, SubprocessExecutor};
