//! Integration tests for the worker pool's admission, recycling, and idle
//! decay behavior.
//!
//! Test organization:
//! - queue_bounds.rs: admission/queue-full behavior under saturation
//! - recycling.rs: per-worker task-count and deadline-driven recycling
//! - idle_decay.rs: idle worker teardown down to `min_workers`

#[path = "workerpool/mod.rs"]
mod workerpool;
