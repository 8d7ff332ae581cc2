//! Integration tests for the rate limiter's public admission surface.
//!
//! Test organization:
//! - fixed_window.rs: per-client fixed-window admission and reset
//! - degradation.rs: distributed-backend-unreachable fallback to local mode

#[path = "ratelimiter/mod.rs"]
mod ratelimiter;
