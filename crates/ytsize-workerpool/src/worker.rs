//! A single worker task: owns no state the pool's control loop touches
//! directly, communicating only via the two mpsc channels (commands in,
//! notifications out).

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::events::{WorkerId, WorkerPoolEvent};
use crate::pool::Inner;
use crate::task::Task;
use ytsize_core::CoreErrorCode;
use ytsize_executor::{ExecuteRequest, ExecutorError};

pub enum WorkerCommand {
    Run(Task),
    Shutdown,
}

pub enum WorkerNotification {
    Idle(WorkerId),
    Recycled(WorkerId),
}

/// Spawns a worker task and returns the sender half of its command channel.
pub fn spawn(inner: Arc<Inner>, id: WorkerId) -> mpsc::UnboundedSender<WorkerCommand> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WorkerCommand>();

    tokio::spawn(async move {
        let mut tasks_completed: u32 = 0;

        while let Some(command) = rx.recv().await {
            match command {
                WorkerCommand::Run(task) => {
                    let outcome = run_task(&inner, id, task).await;
                    tasks_completed += 1;

                    if should_recycle(outcome, tasks_completed, inner.config.max_tasks_per_worker) {
                        inner.events.emit(&WorkerPoolEvent::WorkerRecycled {
                            pattern_name: inner.config.name.clone(),
                            timestamp: Instant::now(),
                            worker_id: id,
                            tasks_completed,
                        });
                        let _ = inner.notify_tx.send(WorkerNotification::Recycled(id));
                        break;
                    }

                    let _ = inner.notify_tx.send(WorkerNotification::Idle(id));
                }
                WorkerCommand::Shutdown => break,
            }
        }

        inner.workers_destroyed.fetch_add(1, Ordering::Relaxed);
        inner.events.emit(&WorkerPoolEvent::WorkerDestroyed {
            pattern_name: inner.config.name.clone(),
            timestamp: Instant::now(),
            worker_id: id,
        });
    });

    tx
}

/// Whether the task finished within the worker's own deadline. A worker
/// whose deadline fired is recycled rather than returned to idle: its
/// subprocess may still be running and holding resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOutcome {
    Completed,
    DeadlineExceeded,
}

/// A worker is recycled either because its own deadline fired (its
/// subprocess may still be holding resources, so it can't be trusted with
/// further work) or because it reached `max_tasks_per_worker`. Pulled out
/// as a pure function so the recycle decision itself is testable without
/// standing up a runtime and a real subprocess.
fn should_recycle(outcome: TaskOutcome, tasks_completed: u32, max_tasks_per_worker: u32) -> bool {
    outcome == TaskOutcome::DeadlineExceeded || tasks_completed >= max_tasks_per_worker
}

async fn run_task(inner: &Arc<Inner>, worker_id: WorkerId, task: Task) -> TaskOutcome {
    let Task {
        url,
        timeout,
        max_output_bytes,
        cookies,
        completion: _,
        ..
    } = &task;

    let deadline = timeout.saturating_add(inner.config.task_timeout_buffer);

    let (result, outcome) = match tokio::time::timeout(
        deadline,
        inner.executor.execute(ExecuteRequest {
            url: url.as_str(),
            timeout: *timeout,
            max_output_bytes: *max_output_bytes,
            cookies: cookies.as_deref(),
        }),
    )
    .await
    {
        Ok(result) => (result, TaskOutcome::Completed),
        Err(_elapsed) => (
            Err(ExecutorError::new(
                CoreErrorCode::Timeout,
                "worker pool deadline exceeded waiting on subprocess executor",
            )),
            TaskOutcome::DeadlineExceeded,
        ),
    };

    match &result {
        Ok(_) => {
            inner.completed_tasks.fetch_add(1, Ordering::Relaxed);
            inner.events.emit(&WorkerPoolEvent::TaskCompleted {
                pattern_name: inner.config.name.clone(),
                timestamp: Instant::now(),
                worker_id,
            });
        }
        Err(err) => {
            inner.failed_tasks.fetch_add(1, Ordering::Relaxed);
            inner.events.emit(&WorkerPoolEvent::TaskFailed {
                pattern_name: inner.config.name.clone(),
                timestamp: Instant::now(),
                worker_id,
                code: err.code,
            });
        }
    }

    task.complete(result);
    outcome
}
