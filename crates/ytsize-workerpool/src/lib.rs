//! Worker pool: a bounded FIFO admission queue feeding a table of
//! subprocess-executing workers. A queued pool rather than a simple permit
//! semaphore, since admission here means "enqueue or bind now" rather than
//! a 1:1 permit acquisition.

pub mod config;
pub mod error;
pub mod events;
pub mod pool;
pub mod task;
pub mod worker;

pub use config::{WorkerPoolConfig, WorkerPoolConfigBuilder};
pub use error::WorkerPoolError;
pub use events::{WorkerId, WorkerPoolEvent};
pub use pool::{PoolStats, PoolStatsConfig, WorkerPool};
pub use task::{Task, TaskResult};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use ytsize_core::CoreErrorCode;
    use ytsize_executor::{SubprocessConfig, SubprocessExecutor};

    fn missing_executable() -> SubprocessExecutor {
        SubprocessExecutor::new(
            SubprocessConfig::builder()
                .ytdlp_path("/nonexistent/definitely-not-yt-dlp")
                .build(),
        )
    }

    #[tokio::test]
    async fn dispatch_runs_a_task_and_resolves_its_completion_handle() {
        let pool = WorkerPool::new(
            WorkerPoolConfig::builder().max_workers(1).build(),
            missing_executable(),
        );

        let (task, receiver) = Task::new(
            "https://www.youtube.com/watch?v=jNQXAC9IVRw",
            Duration::from_secs(2),
            1024,
            None,
        );
        pool.dispatch(task).await.unwrap();

        let result = receiver.await.unwrap();
        assert_eq!(result.unwrap_err().code, CoreErrorCode::NotFound);
    }

    #[tokio::test]
    async fn queue_full_rejects_once_workers_and_queue_are_saturated() {
        let pool = WorkerPool::new(
            WorkerPoolConfig::builder()
                .max_workers(1)
                .max_queue_size(1)
                .build(),
            missing_executable(),
        );

        let (task_a, _rx_a) = Task::new("u1", Duration::from_millis(50), 1024, None);
        let (task_b, _rx_b) = Task::new("u2", Duration::from_millis(50), 1024, None);
        let (task_c, _rx_c) = Task::new("u3", Duration::from_millis(50), 1024, None);

        pool.dispatch(task_a).await.unwrap();
        pool.dispatch(task_b).await.unwrap();
        let rejected = pool.dispatch(task_c).await;

        assert!(matches!(
            rejected,
            Err(WorkerPoolError::QueueFull { max_queue_size: 1 })
        ));
    }

    #[tokio::test]
    async fn shutdown_rejects_queued_tasks_with_shutting_down() {
        let pool_cell = Arc::new(tokio::sync::Mutex::new(WorkerPool::new(
            WorkerPoolConfig::builder()
                .max_workers(1)
                .max_queue_size(4)
                .build(),
            missing_executable(),
        )));

        let (task_a, _rx_a) = Task::new("u1", Duration::from_secs(3), 1024, None);
        let (task_b, rx_b) = Task::new("u2", Duration::from_secs(3), 1024, None);

        {
            let pool = pool_cell.lock().await;
            pool.dispatch(task_a).await.unwrap();
            pool.dispatch(task_b).await.unwrap();
        }

        pool_cell.lock().await.shutdown().await;

        let result = rx_b.await.unwrap();
        assert_eq!(result.unwrap_err().code, CoreErrorCode::ShuttingDown);
    }

    #[tokio::test]
    async fn new_admissions_are_rejected_after_shutdown() {
        let mut pool = WorkerPool::new(
            WorkerPoolConfig::builder().max_workers(1).build(),
            missing_executable(),
        );
        pool.shutdown().await;

        let (task, _rx) = Task::new("u1", Duration::from_secs(1), 1024, None);
        let result = pool.dispatch(task).await;
        assert!(matches!(result, Err(WorkerPoolError::ShuttingDown)));
    }

    #[tokio::test]
    async fn stats_track_dispatched_and_failed_tasks() {
        let pool = WorkerPool::new(
            WorkerPoolConfig::builder().max_workers(2).build(),
            missing_executable(),
        );

        let (task, rx) = Task::new(
            "https://www.youtube.com/watch?v=jNQXAC9IVRw",
            Duration::from_secs(2),
            1024,
            None,
        );
        pool.dispatch(task).await.unwrap();
        let _ = rx.await;

        let stats = pool.stats().await;
        assert_eq!(stats.total_tasks, 1);
        assert_eq!(stats.failed_tasks, 1);
        assert_eq!(stats.completed_tasks, 0);
        assert_eq!(stats.workers_created, 1);
        assert_eq!(stats.peak_workers, 1);
        assert_eq!(stats.config.max_workers, 2);
    }

    #[tokio::test]
    async fn event_listeners_observe_worker_lifecycle() {
        let created = Arc::new(AtomicUsize::new(0));
        let created_clone = Arc::clone(&created);

        let config = WorkerPoolConfig::builder()
            .max_workers(2)
            .on_event(move |event| {
                if matches!(event, WorkerPoolEvent::WorkerCreated { .. }) {
                    created_clone.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build();

        let pool = WorkerPool::new(config, missing_executable());
        let (task, rx) = Task::new("u1", Duration::from_secs(1), 1024, None);
        pool.dispatch(task).await.unwrap();
        let _ = rx.await;

        assert_eq!(created.load(Ordering::SeqCst), 1);
    }
}
