//! Distributed fixed-window counter backed by a shared key-value store.
//!
//! The increment-and-TTL pair is issued as one pipelined round trip
//! (`INCR` then `EXPIRE ... NX`, wrapped in `MULTI`/`EXEC` via
//! [`redis::Pipeline::atomic`]) so the TTL is armed only the first time a
//! window key is created, never refreshed on subsequent increments.

use crate::error::BackendError;
use crate::backend::RateLimitBackend;
use redis::aio::ConnectionManager;
use std::time::Duration;
use tokio::sync::Mutex;

pub struct RedisBackend {
    conn: Mutex<ConnectionManager>,
}

impl RedisBackend {
    /// Attempts the initial connection with capped exponential backoff:
    /// `min(retries * 100ms, 3000ms)`, up to 10 retries, before surfacing a
    /// hard [`BackendError::Connection`]. `ConnectionManager` itself takes
    /// over steady-state reconnection once established.
    pub async fn connect(redis_url: &str) -> Result<Self, BackendError> {
        let client = redis::Client::open(redis_url)
            .map_err(|err| BackendError::Connection(err.to_string()))?;

        let mut last_err = None;
        for attempt in 0..10u32 {
            match client.get_connection_manager().await {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                    })
                }
                Err(err) => {
                    last_err = Some(err.to_string());
                    let backoff = Duration::from_millis((attempt as u64 + 1) * 100).min(
                        Duration::from_millis(3000),
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        Err(BackendError::Connection(
            last_err.unwrap_or_else(|| "connection attempts exhausted".to_string()),
        ))
    }
}

impl RateLimitBackend for RedisBackend {
    async fn incr_with_ttl(&self, key: &str, window: Duration) -> Result<u64, BackendError> {
        let mut conn = self.conn.lock().await;
        let (count, _expire_set): (u64, bool) = redis::pipe()
            .atomic()
            .cmd("INCR")
            .arg(key)
            .cmd("EXPIRE")
            .arg(key)
            .arg(window.as_secs().max(1))
            .arg("NX")
            .query_async(&mut *conn)
            .await
            .map_err(|err| BackendError::Operation(err.to_string()))?;
        Ok(count)
    }

    async fn quit(&self) {
        let mut conn = self.conn.lock().await;
        let _: Result<(), _> = redis::cmd("QUIT").query_async(&mut *conn).await;
    }
}
