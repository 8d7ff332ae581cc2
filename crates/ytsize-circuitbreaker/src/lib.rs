//! Circuit breaker: trips on absolute failure counts rather than a
//! windowed rate, with a fast path that forces `Open` after three
//! consecutive critical-coded failures regardless of volume. Not a
//! `tower::Service` — the worker pool calls [`CircuitBreaker::execute`]
//! directly around a subprocess dispatch.
//!
//! ```rust
//! use ytsize_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig};
//! use ytsize_core::CoreErrorCode;
//!
//! # async fn example() {
//! let breaker = CircuitBreaker::new(
//!     CircuitBreakerConfig::builder()
//!         .failure_threshold(5)
//!         .volume_threshold(10)
//!         .build(),
//! );
//!
//! let result = breaker
//!     .execute(
//!         || async { Ok::<_, CoreErrorCode>("ok") },
//!         |code: &CoreErrorCode| *code,
//!     )
//!     .await;
//! # let _ = result;
//! # }
//! ```

pub mod circuit;
pub mod config;
pub mod error;
pub mod events;
pub mod layer;

pub use circuit::{CircuitMetrics, CircuitState};
pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
pub use error::CircuitBreakerError;
pub use events::CircuitBreakerEvent;
pub use layer::CircuitBreaker;
