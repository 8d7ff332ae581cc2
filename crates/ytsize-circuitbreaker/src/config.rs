//! Configuration for the circuit breaker. Operates directly on
//! [`CoreErrorCode`] (every caller already classifies its own errors
//! through [`CoreErrorCode::is_critical`]) rather than a generic
//! `failure_classifier` closure over arbitrary response/error types, and
//! counts absolute occurrences rather than a windowed rate.

use crate::events::CircuitBreakerEvent;
use std::time::Duration;
use ytsize_core::events::{EventListeners, FnListener};

#[derive(Clone)]
pub struct CircuitBreakerConfig {
    /// Number of failures (within the current closed-state run) required
    /// before the breaker opens, provided `volume_threshold` is also met.
    pub failure_threshold: usize,
    /// Minimum number of calls observed before `failure_threshold` can trip
    /// the breaker — guards against opening on a handful of early failures.
    pub volume_threshold: usize,
    /// How long the breaker stays `Open` before allowing a half-open probe.
    pub wait_duration_in_open: Duration,
    /// Number of probe calls permitted while `HalfOpen`.
    pub permitted_calls_in_half_open: u32,
    /// Number of consecutive successful probes required while `HalfOpen`
    /// before the breaker closes.
    pub success_threshold: u32,
    pub name: String,
    pub(crate) event_listeners: EventListeners<CircuitBreakerEvent>,
}

impl CircuitBreakerConfig {
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::default()
    }
}

pub struct CircuitBreakerConfigBuilder {
    failure_threshold: usize,
    volume_threshold: usize,
    wait_duration_in_open: Duration,
    permitted_calls_in_half_open: u32,
    success_threshold: u32,
    name: String,
    event_listeners: EventListeners<CircuitBreakerEvent>,
}

impl Default for CircuitBreakerConfigBuilder {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            volume_threshold: 10,
            wait_duration_in_open: Duration::from_secs(30),
            permitted_calls_in_half_open: 1,
            success_threshold: 2,
            name: "circuit-breaker".to_string(),
            event_listeners: EventListeners::new(),
        }
    }
}

impl CircuitBreakerConfigBuilder {
    pub fn failure_threshold(mut self, failure_threshold: usize) -> Self {
        self.failure_threshold = failure_threshold;
        self
    }

    pub fn volume_threshold(mut self, volume_threshold: usize) -> Self {
        self.volume_threshold = volume_threshold;
        self
    }

    pub fn wait_duration_in_open(mut self, wait_duration_in_open: Duration) -> Self {
        self.wait_duration_in_open = wait_duration_in_open;
        self
    }

    pub fn permitted_calls_in_half_open(mut self, permitted_calls_in_half_open: u32) -> Self {
        self.permitted_calls_in_half_open = permitted_calls_in_half_open;
        self
    }

    pub fn success_threshold(mut self, success_threshold: u32) -> Self {
        self.success_threshold = success_threshold;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a closure invoked for every emitted event, regardless of
    /// variant. For variant-specific handling, match inside the closure.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&CircuitBreakerEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(f));
        self
    }

    pub fn build(self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            volume_threshold: self.volume_threshold,
            wait_duration_in_open: self.wait_duration_in_open,
            permitted_calls_in_half_open: self.permitted_calls_in_half_open,
            success_threshold: self.success_threshold,
            name: self.name,
            event_listeners: self.event_listeners,
        }
    }
}
