//! The active rate limiter: dispatches admission checks to whichever
//! backend is currently live, demoting itself from `Distributed` to
//! `Local` the moment a Redis call fails at the connection level. The
//! limiter never rejects an admission because of a backend outage — only
//! because a client is actually over its quota.

use crate::backend::RateLimitBackend;
use crate::config::RateLimiterConfig;
use crate::error::{BackendError, RateLimitExceeded};
use crate::events::RateLimiterEvent;
use crate::local_backend::LocalBackend;
use crate::redis_backend::RedisBackend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Which counter backend is currently serving admission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Distributed,
    Local,
}

enum ActiveBackend {
    Distributed(RedisBackend),
    Local(LocalBackend),
}

pub struct Admission {
    pub remaining: u64,
    pub reset_after: Duration,
}

pub struct RateLimiter {
    backend: RwLock<ActiveBackend>,
    /// Set once a distributed backend has failed and the limiter fell back
    /// — distinct from having started in local-only mode by configuration.
    degraded: AtomicBool,
    config: RateLimiterConfig,
}

impl RateLimiter {
    /// Starts in local-only mode — distributed rate limiting disabled by
    /// configuration, not a degradation.
    pub fn local_only(config: RateLimiterConfig) -> Self {
        Self {
            backend: RwLock::new(ActiveBackend::Local(LocalBackend::new())),
            degraded: AtomicBool::new(false),
            config,
        }
    }

    /// Attempts to connect to the distributed backend; on failure, starts
    /// degraded in local mode and emits [`RateLimiterEvent::DegradedToLocal`]
    /// rather than failing startup (per the non-fatal RL init rule).
    pub async fn connect(redis_url: &str, config: RateLimiterConfig) -> Self {
        match RedisBackend::connect(redis_url).await {
            Ok(backend) => Self {
                backend: RwLock::new(ActiveBackend::Distributed(backend)),
                degraded: AtomicBool::new(false),
                config,
            },
            Err(err) => {
                config.event_listeners.emit(&RateLimiterEvent::DegradedToLocal {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    reason: err.to_string(),
                });
                Self {
                    backend: RwLock::new(ActiveBackend::Local(LocalBackend::new())),
                    degraded: AtomicBool::new(true),
                    config,
                }
            }
        }
    }

    pub async fn backend_mode(&self) -> BackendMode {
        match &*self.backend.read().await {
            ActiveBackend::Distributed(_) => BackendMode::Distributed,
            ActiveBackend::Local(_) => BackendMode::Local,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    /// Checks and records one admission for `client_key`. Namespaces the key
    /// under the configured prefix; on a connection-level backend failure,
    /// demotes to local and serves the request from the freshly created
    /// local counter rather than rejecting it.
    pub async fn check(&self, client_key: &str) -> Result<Admission, RateLimitExceeded> {
        if self.config.bypass {
            return Ok(Admission {
                remaining: self.config.max_requests,
                reset_after: Duration::ZERO,
            });
        }

        let namespaced_key = format!("{}:{}", self.config.key_prefix, client_key);
        let count = self.incr(&namespaced_key).await;

        if count > self.config.max_requests {
            let retry_after = self.config.window;
            self.config.event_listeners.emit(&RateLimiterEvent::PermitRejected {
                pattern_name: self.config.name.clone(),
                timestamp: Instant::now(),
                key: namespaced_key,
                retry_after,
            });
            return Err(RateLimitExceeded { retry_after });
        }

        let remaining = self.config.max_requests.saturating_sub(count);
        self.config.event_listeners.emit(&RateLimiterEvent::PermitGranted {
            pattern_name: self.config.name.clone(),
            timestamp: Instant::now(),
            key: namespaced_key,
            remaining,
        });

        Ok(Admission {
            remaining,
            reset_after: self.config.window,
        })
    }

    async fn incr(&self, key: &str) -> u64 {
        let result = {
            let backend = self.backend.read().await;
            match &*backend {
                ActiveBackend::Distributed(redis) => redis.incr_with_ttl(key, self.config.window).await,
                ActiveBackend::Local(local) => local.incr_with_ttl(key, self.config.window).await,
            }
        };

        match result {
            Ok(count) => count,
            Err(err) => {
                self.demote(err).await;
                let backend = self.backend.read().await;
                match &*backend {
                    ActiveBackend::Local(local) => {
                        local.incr_with_ttl(key, self.config.window).await.unwrap_or(1)
                    }
                    ActiveBackend::Distributed(_) => 1,
                }
            }
        }
    }

    async fn demote(&self, err: BackendError) {
        let mut backend = self.backend.write().await;
        if matches!(&*backend, ActiveBackend::Local(_)) {
            return;
        }
        *backend = ActiveBackend::Local(LocalBackend::new());
        self.degraded.store(true, Ordering::Release);
        self.config.event_listeners.emit(&RateLimiterEvent::DegradedToLocal {
            pattern_name: self.config.name.clone(),
            timestamp: Instant::now(),
            reason: err.to_string(),
        });
    }

    /// Gracefully closes the backend connection (`QUIT`), part of the
    /// shutdown sequence.
    pub async fn quit(&self) {
        let backend = self.backend.read().await;
        if let ActiveBackend::Distributed(redis) = &*backend {
            redis.quit().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RateLimiterConfig {
        RateLimiterConfig::builder()
            .max_requests(2)
            .window(Duration::from_secs(60))
            .build()
    }

    #[tokio::test]
    async fn admits_up_to_max_requests_then_rejects() {
        let limiter = RateLimiter::local_only(config());
        assert!(limiter.check("client-a").await.is_ok());
        assert!(limiter.check("client-a").await.is_ok());
        let rejected = limiter.check("client-a").await;
        assert!(rejected.is_err());
    }

    #[tokio::test]
    async fn distinct_clients_have_independent_quotas() {
        let limiter = RateLimiter::local_only(config());
        assert!(limiter.check("a").await.is_ok());
        assert!(limiter.check("a").await.is_ok());
        assert!(limiter.check("b").await.is_ok());
    }

    #[tokio::test]
    async fn bypass_always_admits() {
        let limiter = RateLimiter::local_only(
            RateLimiterConfig::builder().max_requests(1).bypass(true).build(),
        );
        for _ in 0..5 {
            assert!(limiter.check("client").await.is_ok());
        }
    }

    #[tokio::test]
    async fn local_only_mode_reports_local_backend() {
        let limiter = RateLimiter::local_only(config());
        assert_eq!(limiter.backend_mode().await, BackendMode::Local);
        assert!(!limiter.is_degraded());
    }
}
