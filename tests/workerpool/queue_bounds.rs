use std::time::Duration;
use ytsize_workerpool::{Task, WorkerPool, WorkerPoolConfig, WorkerPoolError};

use super::missing_executable;

#[tokio::test]
async fn queue_full_once_workers_and_queue_are_saturated() {
    let pool = WorkerPool::new(
        WorkerPoolConfig::builder().max_workers(1).max_queue_size(1).build(),
        missing_executable(),
    );

    let (task_a, _rx_a) = Task::new("u1", Duration::from_millis(50), 1024, None);
    let (task_b, _rx_b) = Task::new("u2", Duration::from_millis(50), 1024, None);
    let (task_c, _rx_c) = Task::new("u3", Duration::from_millis(50), 1024, None);

    pool.dispatch(task_a).await.unwrap();
    pool.dispatch(task_b).await.unwrap();
    let rejected = pool.dispatch(task_c).await;

    assert!(matches!(rejected, Err(WorkerPoolError::QueueFull { max_queue_size: 1 })));
}

#[tokio::test]
async fn stats_report_total_dispatched_tasks_even_once_queued() {
    let pool = WorkerPool::new(
        WorkerPoolConfig::builder().max_workers(1).max_queue_size(4).build(),
        missing_executable(),
    );

    let (task_a, _rx_a) = Task::new("u1", Duration::from_secs(3), 1024, None);
    let (task_b, _rx_b) = Task::new("u2", Duration::from_secs(3), 1024, None);

    pool.dispatch(task_a).await.unwrap();
    pool.dispatch(task_b).await.unwrap();

    let stats = pool.stats().await;
    assert_eq!(stats.total_tasks, 2);
    assert_eq!(stats.queue_length, 1, "second task sits behind the one busy worker");
    assert_eq!(stats.config.max_queue_size, 4);
}

#[tokio::test]
async fn queued_tasks_are_rejected_with_shutting_down_once_drained() {
    let mut pool = WorkerPool::new(
        WorkerPoolConfig::builder().max_workers(1).max_queue_size(4).build(),
        missing_executable(),
    );

    let (task_a, _rx_a) = Task::new("u1", Duration::from_secs(3), 1024, None);
    let (task_b, rx_b) = Task::new("u2", Duration::from_secs(3), 1024, None);
    pool.dispatch(task_a).await.unwrap();
    pool.dispatch(task_b).await.unwrap();

    pool.shutdown().await;

    let result = rx_b.await.unwrap();
    assert_eq!(result.unwrap_err().code, ytsize_core::CoreErrorCode::ShuttingDown);
}
