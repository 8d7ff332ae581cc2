//! Typed events emitted by the worker pool.

use std::time::Instant;
use ytsize_core::events::ResilienceEvent;
use ytsize_core::CoreErrorCode;

pub type WorkerId = u64;

#[derive(Debug, Clone)]
pub enum WorkerPoolEvent {
    WorkerCreated {
        pattern_name: String,
        timestamp: Instant,
        worker_id: WorkerId,
    },
    WorkerDestroyed {
        pattern_name: String,
        timestamp: Instant,
        worker_id: WorkerId,
    },
    WorkerRecycled {
        pattern_name: String,
        timestamp: Instant,
        worker_id: WorkerId,
        tasks_completed: u32,
    },
    TaskQueued {
        pattern_name: String,
        timestamp: Instant,
        queue_depth: usize,
    },
    TaskDispatched {
        pattern_name: String,
        timestamp: Instant,
        worker_id: WorkerId,
    },
    TaskCompleted {
        pattern_name: String,
        timestamp: Instant,
        worker_id: WorkerId,
    },
    TaskFailed {
        pattern_name: String,
        timestamp: Instant,
        worker_id: WorkerId,
        code: CoreErrorCode,
    },
    TaskRejected {
        pattern_name: String,
        timestamp: Instant,
        code: CoreErrorCode,
    },
    QueueFull {
        pattern_name: String,
        timestamp: Instant,
        max_queue_size: usize,
    },
}

impl ResilienceEvent for WorkerPoolEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WorkerPoolEvent::WorkerCreated { .. } => "worker_created",
            WorkerPoolEvent::WorkerDestroyed { .. } => "worker_destroyed",
            WorkerPoolEvent::WorkerRecycled { .. } => "worker_recycled",
            WorkerPoolEvent::TaskQueued { .. } => "task_queued",
            WorkerPoolEvent::TaskDispatched { .. } => "task_dispatched",
            WorkerPoolEvent::TaskCompleted { .. } => "task_completed",
            WorkerPoolEvent::TaskFailed { .. } => "task_failed",
            WorkerPoolEvent::TaskRejected { .. } => "task_rejected",
            WorkerPoolEvent::QueueFull { .. } => "queue_full",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            WorkerPoolEvent::WorkerCreated { timestamp, .. }
            | WorkerPoolEvent::WorkerDestroyed { timestamp, .. }
            | WorkerPoolEvent::WorkerRecycled { timestamp, .. }
            | WorkerPoolEvent::TaskQueued { timestamp, .. }
            | WorkerPoolEvent::TaskDispatched { timestamp, .. }
            | WorkerPoolEvent::TaskCompleted { timestamp, .. }
            | WorkerPoolEvent::TaskFailed { timestamp, .. }
            | WorkerPoolEvent::TaskRejected { timestamp, .. }
            | WorkerPoolEvent::QueueFull { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            WorkerPoolEvent::WorkerCreated { pattern_name, .. }
            | WorkerPoolEvent::WorkerDestroyed { pattern_name, .. }
            | WorkerPoolEvent::WorkerRecycled { pattern_name, .. }
            | WorkerPoolEvent::TaskQueued { pattern_name, .. }
            | WorkerPoolEvent::TaskDispatched { pattern_name, .. }
            | WorkerPoolEvent::TaskCompleted { pattern_name, .. }
            | WorkerPoolEvent::TaskFailed { pattern_name, .. }
            | WorkerPoolEvent::TaskRejected { pattern_name, .. }
            | WorkerPoolEvent::QueueFull { pattern_name, .. } => pattern_name,
        }
    }
}
