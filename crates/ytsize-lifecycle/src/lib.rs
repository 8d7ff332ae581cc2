//! Process lifecycle coordination: startup ordering and a bounded
//! drain-then-exit shutdown sequence across the worker pool, circuit
//! breaker, and rate limiter.
//!
//! ```
//! use std::sync::Arc;
//! use tokio::sync::Mutex;
//! use ytsize_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig};
//! use ytsize_executor::{SubprocessConfig, SubprocessExecutor};
//! use ytsize_lifecycle::{LifecycleConfig, LifecycleController};
//! use ytsize_ratelimiter::{RateLimiter, RateLimiterConfig};
//! use ytsize_workerpool::{WorkerPool, WorkerPoolConfig};
//!
//! # async fn example() {
//! let pool = Arc::new(Mutex::new(WorkerPool::new(
//!     WorkerPoolConfig::builder().build(),
//!     SubprocessExecutor::new(SubprocessConfig::builder().build()),
//! )));
//! let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig::builder().build()));
//! let limiter = Arc::new(RateLimiter::local_only(RateLimiterConfig::builder().build()));
//!
//! let controller = LifecycleController::new(
//!     Arc::downgrade(&pool),
//!     Arc::downgrade(&breaker),
//!     Arc::downgrade(&limiter),
//!     LifecycleConfig::builder().build(),
//! );
//!
//! controller.shutdown().await;
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod events;

pub use config::{LifecycleConfig, LifecycleConfigBuilder};
pub use controller::{ConnectionGuard, LifecycleController, LifecycleState};
pub use events::LifecycleEvent;
