use crate::events::RateLimiterEvent;
use std::time::Duration;
use ytsize_core::events::{EventListeners, FnListener};

/// Configuration for the rate limiter (`RATE_LIMIT_WINDOW_MS` /
/// `RATE_LIMIT_MAX_REQUESTS` at startup).
pub struct RateLimiterConfig {
    pub window: Duration,
    pub max_requests: u64,
    /// Namespace prepended to every key, e.g. `rl:<scope>`.
    pub key_prefix: String,
    /// Explicit operator opt-in to skip rate limiting entirely (development
    /// only) — never inferred.
    pub bypass: bool,
    pub name: String,
    pub(crate) event_listeners: EventListeners<RateLimiterEvent>,
}

impl RateLimiterConfig {
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::default()
    }
}

pub struct RateLimiterConfigBuilder {
    window: Duration,
    max_requests: u64,
    key_prefix: String,
    bypass: bool,
    name: String,
    event_listeners: EventListeners<RateLimiterEvent>,
}

impl Default for RateLimiterConfigBuilder {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 60,
            key_prefix: "rl:default".to_string(),
            bypass: false,
            name: "rate-limiter".to_string(),
            event_listeners: EventListeners::new(),
        }
    }
}

impl RateLimiterConfigBuilder {
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn max_requests(mut self, max_requests: u64) -> Self {
        self.max_requests = max_requests;
        self
    }

    pub fn key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    pub fn bypass(mut self, bypass: bool) -> Self {
        self.bypass = bypass;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&RateLimiterEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(f));
        self
    }

    pub fn build(self) -> RateLimiterConfig {
        RateLimiterConfig {
            window: self.window,
            max_requests: self.max_requests,
            key_prefix: self.key_prefix,
            bypass: self.bypass,
            name: self.name,
            event_listeners: self.event_listeners,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_are_usable() {
        let config = RateLimiterConfig::builder().build();
        assert_eq!(config.max_requests, 60);
        assert!(!config.bypass);
    }

    #[test]
    fn builder_overrides_apply() {
        let config = RateLimiterConfig::builder()
            .max_requests(10)
            .window(Duration::from_secs(1))
            .bypass(true)
            .name("api")
            .build();
        assert_eq!(config.max_requests, 10);
        assert_eq!(config.window, Duration::from_secs(1));
        assert!(config.bypass);
        assert_eq!(config.name, "api");
    }
}
