//! Counter-storage abstraction shared by the distributed and local backends.

use crate::error::BackendError;
use std::time::Duration;

/// Atomically increments the counter for `key`, arming its TTL to `window`
/// only the first time the key is created within that window, and returns
/// the post-increment count.
pub trait RateLimitBackend: Send + Sync {
    fn incr_with_ttl(
        &self,
        key: &str,
        window: Duration,
    ) -> impl std::future::Future<Output = Result<u64, BackendError>> + Send;

    /// Releases the backend's connection, if any. A no-op for the local
    /// backend.
    fn quit(&self) -> impl std::future::Future<Output = ()> + Send;
}
