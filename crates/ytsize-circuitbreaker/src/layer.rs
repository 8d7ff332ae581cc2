//! The breaker itself. Not a `tower::Service` wrapper: its caller is the
//! worker pool, whose admission contract is "enqueue or bind now" rather
//! than a 1:1 `Service::call`. `execute` instead takes a plain async
//! closure and runs it only if the circuit admits the call.

use crate::circuit::{Circuit, CircuitMetrics, CircuitState};
use crate::config::CircuitBreakerConfig;
use crate::error::CircuitBreakerError;
use crate::events::CircuitBreakerEvent;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use ytsize_core::events::EventListeners;
use ytsize_core::CoreErrorCode;

/// A count-based circuit breaker gating access to a fallible async
/// operation whose errors are already classified as [`CoreErrorCode`].
pub struct CircuitBreaker {
    circuit: Mutex<Circuit>,
    state_atomic: Arc<AtomicU8>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        let state_atomic = Arc::new(AtomicU8::new(CircuitState::Closed as u8));
        Self {
            circuit: Mutex::new(Circuit::new_with_atomic(Arc::clone(&state_atomic))),
            state_atomic,
            config,
        }
    }

    /// Lock-free state read, safe to call from a hot path that only wants to
    /// report status (e.g. health checks) without contending the breaker's
    /// own admission lock.
    pub fn state_sync(&self) -> CircuitState {
        CircuitState::from_u8(self.state_atomic.load(Ordering::Acquire))
    }

    pub fn metrics(&self) -> CircuitMetrics {
        self.circuit.lock().expect("circuit mutex poisoned").metrics()
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    pub fn event_listeners(&self) -> &EventListeners<CircuitBreakerEvent> {
        &self.config.event_listeners
    }

    pub fn force_open(&self) {
        self.circuit
            .lock()
            .expect("circuit mutex poisoned")
            .force_open(&self.config.event_listeners, &self.config.name);
    }

    pub fn force_closed(&self) {
        self.circuit
            .lock()
            .expect("circuit mutex poisoned")
            .force_closed(&self.config.event_listeners, &self.config.name);
    }

    pub fn reset(&self) {
        self.circuit
            .lock()
            .expect("circuit mutex poisoned")
            .reset(&self.config.event_listeners, &self.config.name);
    }

    /// Runs `op` if the circuit admits the call, classifying its result with
    /// `classify` to decide whether it counts as a success or a failure (and,
    /// for failures, which [`CoreErrorCode`] to weigh against the critical
    /// fast path).
    pub async fn execute<T, E, F, Fut>(
        &self,
        op: F,
        classify: impl Fn(&E) -> CoreErrorCode,
    ) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permitted = {
            let mut circuit = self.circuit.lock().expect("circuit mutex poisoned");
            circuit.try_acquire(&self.config, &self.config.event_listeners, &self.config.name)
        };

        if !permitted {
            self.config.event_listeners.emit(&CircuitBreakerEvent::CallRejected {
                pattern_name: self.config.name.clone(),
                timestamp: Instant::now(),
            });
            return Err(CircuitBreakerError::OpenCircuit);
        }

        let state = self.state_sync();
        self.config.event_listeners.emit(&CircuitBreakerEvent::CallPermitted {
            pattern_name: self.config.name.clone(),
            timestamp: Instant::now(),
            state,
        });

        let started = Instant::now();
        match op().await {
            Ok(value) => {
                let mut circuit = self.circuit.lock().expect("circuit mutex poisoned");
                circuit.record_success(&self.config, &self.config.event_listeners, &self.config.name);
                drop(circuit);
                self.config.event_listeners.emit(&CircuitBreakerEvent::SuccessRecorded {
                    pattern_name: self.config.name.clone(),
                    timestamp: Instant::now(),
                    state: self.state_sync(),
                });
                Ok(value)
            }
            Err(err) => {
                let code = classify(&err);
                let mut circuit = self.circuit.lock().expect("circuit mutex poisoned");
                circuit.record_failure(code, &self.config, &self.config.event_listeners, &self.config.name);
                drop(circuit);
                self.config.event_listeners.emit(&CircuitBreakerEvent::FailureRecorded {
                    pattern_name: self.config.name.clone(),
                    timestamp: Instant::now(),
                    state: self.state_sync(),
                    duration: started.elapsed(),
                });
                Err(CircuitBreakerError::Inner(err))
            }
        }
    }
}
