use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use ytsize_core::CoreErrorCode;

/// State of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CircuitState {
    /// Calls are allowed through.
    Closed = 0,
    /// Calls are rejected outright.
    Open = 1,
    /// A limited number of probe calls are allowed through to test recovery.
    HalfOpen = 2,
}

impl CircuitState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => CircuitState::Closed,
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }
}

/// Point-in-time snapshot of the circuit's counters, for health/status
/// reporting without taking the lock twice.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitMetrics {
    pub state: CircuitState,
    pub request_count: usize,
    pub failure_count: usize,
    pub consecutive_critical_failures: u32,
    pub time_since_state_change: Duration,
}

/// The state machine backing the breaker. Counters are absolute and reset on
/// every transition — a count-based design, not a rate-based sliding window:
/// `failure_threshold` and `volume_threshold` are both evaluated on every
/// recorded failure while CLOSED.
pub(crate) struct Circuit {
    state: CircuitState,
    state_atomic: Arc<AtomicU8>,
    last_state_change: Instant,
    request_count: usize,
    failure_count: usize,
    consecutive_critical_failures: u32,
    half_open_calls_permitted: u32,
    consecutive_half_open_successes: u32,
}

impl Circuit {
    pub(crate) fn new_with_atomic(state_atomic: Arc<AtomicU8>) -> Self {
        Self {
            state: CircuitState::Closed,
            state_atomic,
            last_state_change: Instant::now(),
            request_count: 0,
            failure_count: 0,
            consecutive_critical_failures: 0,
            half_open_calls_permitted: 0,
            consecutive_half_open_successes: 0,
        }
    }

    pub(crate) fn state(&self) -> CircuitState {
        self.state
    }

    pub(crate) fn metrics(&self) -> CircuitMetrics {
        CircuitMetrics {
            state: self.state,
            request_count: self.request_count,
            failure_count: self.failure_count,
            consecutive_critical_failures: self.consecutive_critical_failures,
            time_since_state_change: self.last_state_change.elapsed(),
        }
    }

    /// Admission check. `Open` rejects unconditionally until `wait_duration`
    /// has elapsed, at which point the circuit moves itself to `HalfOpen`
    /// and begins metering `permitted_calls_in_half_open` probes.
    pub(crate) fn try_acquire(
        &mut self,
        config: &CircuitBreakerConfig,
        events: &ytsize_core::events::EventListeners<CircuitBreakerEvent>,
        pattern_name: &str,
    ) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if self.last_state_change.elapsed() >= config.wait_duration_in_open {
                    self.transition_to(CircuitState::HalfOpen, events, pattern_name);
                    self.half_open_calls_permitted = config.permitted_calls_in_half_open;
                    self.half_open_calls_permitted =
                        self.half_open_calls_permitted.saturating_sub(1);
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if self.half_open_calls_permitted > 0 {
                    self.half_open_calls_permitted -= 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub(crate) fn record_success(
        &mut self,
        config: &CircuitBreakerConfig,
        events: &ytsize_core::events::EventListeners<CircuitBreakerEvent>,
        pattern_name: &str,
    ) {
        self.consecutive_critical_failures = 0;

        match self.state {
            CircuitState::Closed => {
                self.request_count += 1;
            }
            CircuitState::HalfOpen => {
                self.consecutive_half_open_successes += 1;
                if self.consecutive_half_open_successes >= config.success_threshold {
                    self.transition_to(CircuitState::Closed, events, pattern_name);
                } else {
                    // Admit one more probe so consecutive successes can keep
                    // accruing toward `success_threshold` instead of stalling
                    // with no permitted calls left.
                    self.half_open_calls_permitted += 1;
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Records a failure, evaluating the absolute thresholds on every call
    /// while closed: `failure_count >= failureThreshold AND request_count >=
    /// volumeThreshold` forces `Open`. Three consecutive critical-coded
    /// failures (per [`CoreErrorCode::is_critical`]) force `Open` regardless
    /// of whether `volumeThreshold` has been reached yet.
    pub(crate) fn record_failure(
        &mut self,
        code: CoreErrorCode,
        config: &CircuitBreakerConfig,
        events: &ytsize_core::events::EventListeners<CircuitBreakerEvent>,
        pattern_name: &str,
    ) {
        match self.state {
            CircuitState::HalfOpen => {
                self.transition_to(CircuitState::Open, events, pattern_name);
                return;
            }
            CircuitState::Open => return,
            CircuitState::Closed => {}
        }

        self.request_count += 1;
        self.failure_count += 1;

        if code.is_critical() {
            self.consecutive_critical_failures += 1;
        } else {
            self.consecutive_critical_failures = 0;
        }

        if self.consecutive_critical_failures >= 3 {
            events.emit(&CircuitBreakerEvent::CriticalFailureFastPath {
                pattern_name: pattern_name.to_string(),
                timestamp: Instant::now(),
                consecutive_critical: self.consecutive_critical_failures,
            });
            self.transition_to(CircuitState::Open, events, pattern_name);
            return;
        }

        if self.failure_count >= config.failure_threshold
            && self.request_count >= config.volume_threshold
        {
            self.transition_to(CircuitState::Open, events, pattern_name);
        }
    }

    pub(crate) fn force_open(
        &mut self,
        events: &ytsize_core::events::EventListeners<CircuitBreakerEvent>,
        pattern_name: &str,
    ) {
        self.transition_to(CircuitState::Open, events, pattern_name);
    }

    pub(crate) fn force_closed(
        &mut self,
        events: &ytsize_core::events::EventListeners<CircuitBreakerEvent>,
        pattern_name: &str,
    ) {
        self.transition_to(CircuitState::Closed, events, pattern_name);
    }

    pub(crate) fn reset(
        &mut self,
        events: &ytsize_core::events::EventListeners<CircuitBreakerEvent>,
        pattern_name: &str,
    ) {
        self.transition_to(CircuitState::Closed, events, pattern_name);
    }

    fn transition_to(
        &mut self,
        to: CircuitState,
        events: &ytsize_core::events::EventListeners<CircuitBreakerEvent>,
        pattern_name: &str,
    ) {
        let from = self.state;
        if from == to {
            return;
        }

        self.state = to;
        self.last_state_change = Instant::now();
        self.request_count = 0;
        self.failure_count = 0;
        self.consecutive_critical_failures = 0;
        self.half_open_calls_permitted = 0;
        self.consecutive_half_open_successes = 0;
        self.state_atomic.store(to as u8, Ordering::Release);

        events.emit(&CircuitBreakerEvent::StateTransition {
            pattern_name: pattern_name.to_string(),
            timestamp: Instant::now(),
            from_state: from,
            to_state: to,
        });
    }
}
