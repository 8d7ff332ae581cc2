use crate::events::LifecycleEvent;
use std::time::Duration;
use ytsize_core::events::{EventListeners, FnListener};

/// Deadlines governing the shutdown sequence.
pub struct LifecycleConfig {
    /// Overall budget for the whole shutdown sequence before a forced exit.
    pub shutdown_grace: Duration,
    /// Sub-deadline for draining in-flight connections/requests.
    pub connection_drain_deadline: Duration,
    /// Sub-deadline for the final telemetry flush.
    pub telemetry_flush_deadline: Duration,
    pub name: String,
    pub(crate) event_listeners: EventListeners<LifecycleEvent>,
}

impl LifecycleConfig {
    pub fn builder() -> LifecycleConfigBuilder {
        LifecycleConfigBuilder::default()
    }
}

pub struct LifecycleConfigBuilder {
    shutdown_grace: Duration,
    connection_drain_deadline: Duration,
    telemetry_flush_deadline: Duration,
    name: String,
    event_listeners: EventListeners<LifecycleEvent>,
}

impl Default for LifecycleConfigBuilder {
    fn default() -> Self {
        Self {
            shutdown_grace: Duration::from_secs(30),
            connection_drain_deadline: Duration::from_secs(5),
            telemetry_flush_deadline: Duration::from_secs(2),
            name: "lifecycle".to_string(),
            event_listeners: EventListeners::new(),
        }
    }
}

impl LifecycleConfigBuilder {
    pub fn shutdown_grace(mut self, d: Duration) -> Self {
        self.shutdown_grace = d;
        self
    }

    pub fn connection_drain_deadline(mut self, d: Duration) -> Self {
        self.connection_drain_deadline = d;
        self
    }

    pub fn telemetry_flush_deadline(mut self, d: Duration) -> Self {
        self.telemetry_flush_deadline = d;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(f));
        self
    }

    pub fn build(self) -> LifecycleConfig {
        LifecycleConfig {
            shutdown_grace: self.shutdown_grace,
            connection_drain_deadline: self.connection_drain_deadline,
            telemetry_flush_deadline: self.telemetry_flush_deadline,
            name: self.name,
            event_listeners: self.event_listeners,
        }
    }
}
