//! Integration tests for the lifecycle controller's shutdown sequence.
//!
//! Test organization:
//! - shutdown_sequence.rs: ordering and connection-drain behavior of `shutdown()`

#[path = "lifecycle/mod.rs"]
mod lifecycle;
