use std::time::Duration;
use ytsize_workerpool::{Task, WorkerPool, WorkerPoolConfig};

use super::missing_executable;

#[tokio::test]
async fn idle_workers_above_min_workers_decay_away() {
    let pool = WorkerPool::new(
        WorkerPoolConfig::builder()
            .min_workers(1)
            .max_workers(3)
            .idle_timeout(Duration::from_millis(40))
            .build(),
        missing_executable(),
    );

    // Dispatch three tasks back to back, before awaiting any of them, so
    // each lands on a freshly spawned worker instead of a reused idle one.
    let (task_a, rx_a) = Task::new("u0", Duration::from_secs(2), 1024, None);
    let (task_b, rx_b) = Task::new("u1", Duration::from_secs(2), 1024, None);
    let (task_c, rx_c) = Task::new("u2", Duration::from_secs(2), 1024, None);
    pool.dispatch(task_a).await.unwrap();
    pool.dispatch(task_b).await.unwrap();
    pool.dispatch(task_c).await.unwrap();

    let _ = rx_a.await;
    let _ = rx_b.await;
    let _ = rx_c.await;

    assert_eq!(pool.worker_count().await, 3, "all three workers were spawned to serve the concurrent tasks");

    let mut worker_count = pool.worker_count().await;
    for _ in 0..50 {
        if worker_count <= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        worker_count = pool.worker_count().await;
    }

    assert_eq!(worker_count, 1, "idle workers above min_workers decay away once idle_timeout elapses");
}
