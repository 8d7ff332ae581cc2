//! Integration tests for the circuit breaker's public `execute` surface.
//!
//! Test organization:
//! - thresholds.rs: absolute failure/volume count opening the circuit
//! - half_open.rs: consecutive-success gating of the half-open -> closed transition
//! - critical_fast_path.rs: critical-coded failures forcing open ahead of volume

#[path = "circuitbreaker/mod.rs"]
mod circuitbreaker;
