use std::time::Duration;
use ytsize_workerpool::{Task, WorkerPool, WorkerPoolConfig};

use super::missing_executable;

async fn worker_count_eventually(pool: &WorkerPool, expected: usize) -> usize {
    let mut count = pool.worker_count().await;
    for _ in 0..50 {
        if count == expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        count = pool.worker_count().await;
    }
    count
}

#[tokio::test]
async fn a_worker_recycles_once_it_reaches_its_task_limit() {
    let pool = WorkerPool::new(
        WorkerPoolConfig::builder().max_workers(1).max_tasks_per_worker(1).build(),
        missing_executable(),
    );

    let (task, rx) = Task::new("u1", Duration::from_secs(2), 1024, None);
    pool.dispatch(task).await.unwrap();
    let _ = rx.await;

    assert_eq!(worker_count_eventually(&pool, 0).await, 0, "the single worker recycled after its one task");

    let stats = pool.stats().await;
    assert_eq!(stats.workers_created, 1);
    assert_eq!(stats.workers_destroyed, 1);
}

#[tokio::test]
async fn a_fresh_worker_is_spawned_to_replace_a_recycled_one() {
    let pool = WorkerPool::new(
        WorkerPoolConfig::builder().max_workers(1).max_tasks_per_worker(1).build(),
        missing_executable(),
    );

    let (task_a, rx_a) = Task::new("u1", Duration::from_secs(2), 1024, None);
    pool.dispatch(task_a).await.unwrap();
    let _ = rx_a.await;
    assert_eq!(worker_count_eventually(&pool, 0).await, 0);

    let (task_b, rx_b) = Task::new("u2", Duration::from_secs(2), 1024, None);
    pool.dispatch(task_b).await.unwrap();
    let _ = rx_b.await;

    let stats = pool.stats().await;
    assert_eq!(stats.workers_created, 2, "a new worker replaces the recycled one on the next dispatch");
    assert_eq!(stats.total_tasks, 2);
}
