//! Typed events emitted by the lifecycle controller.

use crate::controller::LifecycleState;
use std::time::Instant;
use ytsize_core::events::ResilienceEvent;

#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    StateTransition {
        pattern_name: String,
        timestamp: Instant,
        from_state: LifecycleState,
        to_state: LifecycleState,
        reason: String,
    },
    StepCompleted {
        pattern_name: String,
        timestamp: Instant,
        step: &'static str,
    },
    DeadlineExceeded {
        pattern_name: String,
        timestamp: Instant,
        step: &'static str,
    },
    ForcedExit {
        pattern_name: String,
        timestamp: Instant,
        reason: String,
    },
}

impl ResilienceEvent for LifecycleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LifecycleEvent::StateTransition { .. } => "state_transition",
            LifecycleEvent::StepCompleted { .. } => "step_completed",
            LifecycleEvent::DeadlineExceeded { .. } => "deadline_exceeded",
            LifecycleEvent::ForcedExit { .. } => "forced_exit",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            LifecycleEvent::StateTransition { timestamp, .. }
            | LifecycleEvent::StepCompleted { timestamp, .. }
            | LifecycleEvent::DeadlineExceeded { timestamp, .. }
            | LifecycleEvent::ForcedExit { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            LifecycleEvent::StateTransition { pattern_name, .. }
            | LifecycleEvent::StepCompleted { pattern_name, .. }
            | LifecycleEvent::DeadlineExceeded { pattern_name, .. }
            | LifecycleEvent::ForcedExit { pattern_name, .. } => pattern_name,
        }
    }
}
