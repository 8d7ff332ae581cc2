//! Per-client fixed-window rate limiter, backed by a distributed
//! key-value store when available and falling back to an in-process
//! counter with graceful degradation on backend unavailability.
//!
//! ```
//! use ytsize_ratelimiter::{RateLimiter, RateLimiterConfig};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let limiter = RateLimiter::local_only(
//!     RateLimiterConfig::builder()
//!         .max_requests(60)
//!         .window(Duration::from_secs(60))
//!         .build(),
//! );
//!
//! match limiter.check("203.0.113.7").await {
//!     Ok(admission) => println!("{} remaining", admission.remaining),
//!     Err(rejected) => println!("rejected, retry after {:?}", rejected.retry_after),
//! }
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod limiter;
pub mod local_backend;
pub mod redis_backend;

pub use backend::RateLimitBackend;
pub use config::{RateLimiterConfig, RateLimiterConfigBuilder};
pub use error::{BackendError, RateLimitExceeded};
pub use events::RateLimiterEvent;
pub use limiter::{Admission, BackendMode, RateLimiter};
pub use local_backend::LocalBackend;
pub use redis_backend::RedisBackend;
