//! In-process fixed-window counter: a plain incrementing counter with
//! reject-over-limit admission rather than a wait-for-permit queue.

use crate::backend::RateLimitBackend;
use crate::error::BackendError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct WindowCounter {
    count: u64,
    deadline: Instant,
}

#[derive(Default)]
pub struct LocalBackend {
    windows: Mutex<HashMap<String, WindowCounter>>,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitBackend for LocalBackend {
    async fn incr_with_ttl(&self, key: &str, window: Duration) -> Result<u64, BackendError> {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("local backend mutex poisoned");

        let counter = windows.entry(key.to_string()).or_insert_with(|| WindowCounter {
            count: 0,
            deadline: now + window,
        });

        if now >= counter.deadline {
            counter.count = 0;
            counter.deadline = now + window;
        }

        counter.count += 1;
        Ok(counter.count)
    }

    async fn quit(&self) {}
}
