//! Typed events emitted by the rate limiter.

use std::time::{Duration, Instant};
use ytsize_core::events::ResilienceEvent;

#[derive(Debug, Clone)]
pub enum RateLimiterEvent {
    PermitGranted {
        pattern_name: String,
        timestamp: Instant,
        key: String,
        remaining: u64,
    },
    PermitRejected {
        pattern_name: String,
        timestamp: Instant,
        key: String,
        retry_after: Duration,
    },
    DegradedToLocal {
        pattern_name: String,
        timestamp: Instant,
        reason: String,
    },
}

impl ResilienceEvent for RateLimiterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RateLimiterEvent::PermitGranted { .. } => "permit_granted",
            RateLimiterEvent::PermitRejected { .. } => "permit_rejected",
            RateLimiterEvent::DegradedToLocal { .. } => "degraded_to_local",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RateLimiterEvent::PermitGranted { timestamp, .. }
            | RateLimiterEvent::PermitRejected { timestamp, .. }
            | RateLimiterEvent::DegradedToLocal { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            RateLimiterEvent::PermitGranted { pattern_name, .. }
            | RateLimiterEvent::PermitRejected { pattern_name, .. }
            | RateLimiterEvent::DegradedToLocal { pattern_name, .. } => pattern_name,
        }
    }
}
