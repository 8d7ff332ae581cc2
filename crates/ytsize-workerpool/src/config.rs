//! Configuration for the worker pool.

use crate::events::WorkerPoolEvent;
use std::time::Duration;
use ytsize_core::events::EventListeners;

#[derive(Clone)]
pub struct WorkerPoolConfig {
    pub(crate) min_workers: usize,
    pub(crate) max_workers: usize,
    pub(crate) max_queue_size: usize,
    pub(crate) max_tasks_per_worker: u32,
    pub(crate) idle_timeout: Duration,
    /// Added on top of a task's own subprocess timeout to get the pool's
    /// own deadline for that task; guards against a worker that never
    /// reports back even after the subprocess itself should have timed out.
    pub(crate) task_timeout_buffer: Duration,
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<WorkerPoolEvent>,
}

impl WorkerPoolConfig {
    pub fn builder() -> WorkerPoolConfigBuilder {
        WorkerPoolConfigBuilder::new()
    }

    pub fn min_workers(&self) -> usize {
        self.min_workers
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }
}

pub struct WorkerPoolConfigBuilder {
    min_workers: usize,
    max_workers: usize,
    max_queue_size: usize,
    max_tasks_per_worker: u32,
    idle_timeout: Duration,
    task_timeout_buffer: Duration,
    name: String,
    event_listeners: EventListeners<WorkerPoolEvent>,
}

impl WorkerPoolConfigBuilder {
    pub fn new() -> Self {
        Self {
            min_workers: 1,
            max_workers: 4,
            max_queue_size: 50,
            max_tasks_per_worker: 100,
            idle_timeout: Duration::from_secs(60),
            task_timeout_buffer: Duration::from_secs(5),
            name: "worker-pool".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Minimum number of workers kept alive even when idle. Default: 1.
    pub fn min_workers(mut self, min: usize) -> Self {
        self.min_workers = min;
        self
    }

    /// Maximum number of workers the pool will spawn. Default: 4.
    pub fn max_workers(mut self, max: usize) -> Self {
        self.max_workers = max;
        self
    }

    /// Maximum number of tasks that may wait in the FIFO queue once all
    /// workers are busy. Default: 50.
    pub fn max_queue_size(mut self, max: usize) -> Self {
        self.max_queue_size = max;
        self
    }

    /// Number of tasks a worker executes before it recycles itself.
    /// Default: 100.
    pub fn max_tasks_per_worker(mut self, max: u32) -> Self {
        self.max_tasks_per_worker = max;
        self
    }

    /// How long a worker above `min_workers` may sit idle before the pool
    /// decays it. Default: 60s.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Grace period added on top of a task's own subprocess timeout before
    /// the pool gives up waiting on the worker. Default: 5s.
    pub fn task_timeout_buffer(mut self, buffer: Duration) -> Self {
        self.task_timeout_buffer = buffer;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&WorkerPoolEvent) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(ytsize_core::events::FnListener::new(f));
        self
    }

    pub fn build(self) -> WorkerPoolConfig {
        WorkerPoolConfig {
            min_workers: self.min_workers,
            max_workers: self.max_workers,
            max_queue_size: self.max_queue_size,
            max_tasks_per_worker: self.max_tasks_per_worker,
            idle_timeout: self.idle_timeout,
            task_timeout_buffer: self.task_timeout_buffer,
            name: self.name,
            event_listeners: self.event_listeners,
        }
    }
}

impl Default for WorkerPoolConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
