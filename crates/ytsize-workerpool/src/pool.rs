//! The pool's single logical owner of queue and worker-table mutation:
//! a bounded FIFO queue plus a worker table. Dispatch and admission both
//! take `Inner::state` briefly and never hold it across an `.await` on
//! subprocess I/O — only the owning mutex itself is ever held across an
//! await, and only for the duration of a channel send.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Mutex};

use crate::config::WorkerPoolConfig;
use crate::error::WorkerPoolError;
use crate::events::{WorkerId, WorkerPoolEvent};
use crate::task::Task;
use crate::worker::{self, WorkerCommand, WorkerNotification};
use ytsize_core::events::EventListeners;
use ytsize_executor::SubprocessExecutor;

struct WorkerHandle {
    sender: mpsc::UnboundedSender<WorkerCommand>,
    busy: bool,
    idle_since: Option<Instant>,
}

struct PoolState {
    workers: HashMap<WorkerId, WorkerHandle>,
    queue: VecDeque<Task>,
    next_worker_id: WorkerId,
    shutting_down: bool,
}

pub(crate) struct Inner {
    state: Mutex<PoolState>,
    pub(crate) config: WorkerPoolConfig,
    pub(crate) executor: Arc<SubprocessExecutor>,
    pub(crate) events: EventListeners<WorkerPoolEvent>,
    pub(crate) notify_tx: mpsc::UnboundedSender<WorkerNotification>,
    pub(crate) total_tasks: AtomicU64,
    pub(crate) completed_tasks: AtomicU64,
    pub(crate) failed_tasks: AtomicU64,
    pub(crate) workers_created: AtomicU64,
    pub(crate) workers_destroyed: AtomicU64,
    pub(crate) peak_workers: AtomicUsize,
}

/// Point-in-time snapshot of pool activity and lifetime counters, for
/// health/status reporting without requiring the caller to poll several
/// accessors under separate locks.
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub active_workers: usize,
    pub queue_length: usize,
    pub active_tasks: usize,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
    pub workers_created: u64,
    pub workers_destroyed: u64,
    pub peak_workers: usize,
    pub config: PoolStatsConfig,
}

/// The subset of [`WorkerPoolConfig`] worth echoing back alongside a stats
/// snapshot, for dashboards that want bounds next to current occupancy.
#[derive(Debug, Clone)]
pub struct PoolStatsConfig {
    pub min_workers: usize,
    pub max_workers: usize,
    pub max_queue_size: usize,
    pub max_tasks_per_worker: u32,
}

/// A bounded pool of subprocess-executing workers fed by a single FIFO
/// admission queue.
pub struct WorkerPool {
    inner: Arc<Inner>,
    notification_loop: Option<tokio::task::JoinHandle<()>>,
    idle_decay: Option<tokio::task::JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(config: WorkerPoolConfig, executor: SubprocessExecutor) -> Self {
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let events = config.event_listeners.clone();

        let inner = Arc::new(Inner {
            state: Mutex::new(PoolState {
                workers: HashMap::new(),
                queue: VecDeque::new(),
                next_worker_id: 0,
                shutting_down: false,
            }),
            config,
            executor: Arc::new(executor),
            events,
            notify_tx,
            total_tasks: AtomicU64::new(0),
            completed_tasks: AtomicU64::new(0),
            failed_tasks: AtomicU64::new(0),
            workers_created: AtomicU64::new(0),
            workers_destroyed: AtomicU64::new(0),
            peak_workers: AtomicUsize::new(0),
        });

        let notification_loop = tokio::spawn(run_notification_loop(Arc::clone(&inner), notify_rx));
        let idle_decay = tokio::spawn(run_idle_decay(Arc::clone(&inner)));

        Self {
            inner,
            notification_loop: Some(notification_loop),
            idle_decay: Some(idle_decay),
        }
    }

    /// Admits a task: dispatches to an idle worker, spawns a new worker, or
    /// enqueues it — in that preference order — rejecting with `QueueFull`
    /// only once the queue itself is at `max_queue_size`.
    pub async fn dispatch(&self, task: Task) -> Result<(), WorkerPoolError> {
        let mut state = self.inner.state.lock().await;

        if state.shutting_down {
            drop(state);
            self.inner.events.emit(&WorkerPoolEvent::TaskRejected {
                pattern_name: self.inner.config.name.clone(),
                timestamp: Instant::now(),
                code: ytsize_core::CoreErrorCode::ShuttingDown,
            });
            return Err(WorkerPoolError::ShuttingDown);
        }

        if let Some((&id, handle)) = state.workers.iter_mut().find(|(_, w)| !w.busy) {
            handle.busy = true;
            handle.idle_since = None;
            let sender = handle.sender.clone();
            drop(state);
            self.inner.total_tasks.fetch_add(1, Ordering::Relaxed);
            let _ = sender.send(WorkerCommand::Run(task));
            self.inner.events.emit(&WorkerPoolEvent::TaskDispatched {
                pattern_name: self.inner.config.name.clone(),
                timestamp: Instant::now(),
                worker_id: id,
            });
            return Ok(());
        }

        if state.workers.len() < self.inner.config.max_workers() {
            let id = state.next_worker_id;
            state.next_worker_id += 1;
            let sender = worker::spawn(Arc::clone(&self.inner), id);
            state.workers.insert(
                id,
                WorkerHandle {
                    sender: sender.clone(),
                    busy: true,
                    idle_since: None,
                },
            );
            let worker_count = state.workers.len();
            drop(state);
            self.inner.total_tasks.fetch_add(1, Ordering::Relaxed);
            self.inner.workers_created.fetch_add(1, Ordering::Relaxed);
            self.inner.peak_workers.fetch_max(worker_count, Ordering::Relaxed);
            let _ = sender.send(WorkerCommand::Run(task));
            self.inner.events.emit(&WorkerPoolEvent::WorkerCreated {
                pattern_name: self.inner.config.name.clone(),
                timestamp: Instant::now(),
                worker_id: id,
            });
            self.inner.events.emit(&WorkerPoolEvent::TaskDispatched {
                pattern_name: self.inner.config.name.clone(),
                timestamp: Instant::now(),
                worker_id: id,
            });
            return Ok(());
        }

        if state.queue.len() < self.inner.config.max_queue_size() {
            state.queue.push_back(task);
            let queue_depth = state.queue.len();
            drop(state);
            self.inner.total_tasks.fetch_add(1, Ordering::Relaxed);
            self.inner.events.emit(&WorkerPoolEvent::TaskQueued {
                pattern_name: self.inner.config.name.clone(),
                timestamp: Instant::now(),
                queue_depth,
            });
            return Ok(());
        }

        let max_queue_size = self.inner.config.max_queue_size();
        drop(state);
        self.inner.events.emit(&WorkerPoolEvent::QueueFull {
            pattern_name: self.inner.config.name.clone(),
            timestamp: Instant::now(),
            max_queue_size,
        });
        Err(WorkerPoolError::QueueFull { max_queue_size })
    }

    /// Number of workers currently alive, for health/status reporting.
    pub async fn worker_count(&self) -> usize {
        self.inner.state.lock().await.workers.len()
    }

    /// Number of tasks currently waiting in the FIFO queue.
    pub async fn queue_depth(&self) -> usize {
        self.inner.state.lock().await.queue.len()
    }

    /// A single consistent snapshot of occupancy and lifetime counters, for
    /// health/status reporting.
    pub async fn stats(&self) -> PoolStats {
        let state = self.inner.state.lock().await;
        let active_workers = state.workers.len();
        let queue_length = state.queue.len();
        let active_tasks = state.workers.values().filter(|w| w.busy).count();
        drop(state);

        PoolStats {
            active_workers,
            queue_length,
            active_tasks,
            total_tasks: self.inner.total_tasks.load(Ordering::Relaxed),
            completed_tasks: self.inner.completed_tasks.load(Ordering::Relaxed),
            failed_tasks: self.inner.failed_tasks.load(Ordering::Relaxed),
            workers_created: self.inner.workers_created.load(Ordering::Relaxed),
            workers_destroyed: self.inner.workers_destroyed.load(Ordering::Relaxed),
            peak_workers: self.inner.peak_workers.load(Ordering::Relaxed),
            config: PoolStatsConfig {
                min_workers: self.inner.config.min_workers(),
                max_workers: self.inner.config.max_workers(),
                max_queue_size: self.inner.config.max_queue_size(),
                max_tasks_per_worker: self.inner.config.max_tasks_per_worker,
            },
        }
    }

    /// Begins draining: rejects new admissions, rejects every task still
    /// sitting in the queue with `ShuttingDown`, and tells every worker to
    /// shut down once its current task (if any) finishes — workers are
    /// never preempted mid-task.
    pub async fn shutdown(&mut self) {
        let mut state = self.inner.state.lock().await;
        state.shutting_down = true;

        while let Some(task) = state.queue.pop_front() {
            task.complete(Err(ytsize_executor::ExecutorError::new(
                ytsize_core::CoreErrorCode::ShuttingDown,
                "worker pool is shutting down",
            )));
        }

        for handle in state.workers.values() {
            let _ = handle.sender.send(WorkerCommand::Shutdown);
        }
        drop(state);

        if let Some(handle) = self.idle_decay.take() {
            handle.abort();
        }
        if let Some(handle) = self.notification_loop.take() {
            handle.abort();
        }
    }
}

async fn run_notification_loop(
    inner: Arc<Inner>,
    mut notify_rx: mpsc::UnboundedReceiver<WorkerNotification>,
) {
    while let Some(notification) = notify_rx.recv().await {
        let mut state = inner.state.lock().await;
        match notification {
            WorkerNotification::Idle(id) => {
                if let Some(next_task) = state.queue.pop_front() {
                    match state.workers.get(&id) {
                        Some(handle) => {
                            let sender = handle.sender.clone();
                            drop(state);
                            let _ = sender.send(WorkerCommand::Run(next_task));
                            inner.events.emit(&WorkerPoolEvent::TaskDispatched {
                                pattern_name: inner.config.name.clone(),
                                timestamp: Instant::now(),
                                worker_id: id,
                            });
                        }
                        None => {
                            // Worker vanished between reporting idle and us
                            // locking the state; put the task back at the
                            // front so the next idle/new worker picks it up.
                            state.queue.push_front(next_task);
                        }
                    }
                } else if let Some(handle) = state.workers.get_mut(&id) {
                    handle.busy = false;
                    handle.idle_since = Some(Instant::now());
                }
            }
            WorkerNotification::Recycled(id) => {
                state.workers.remove(&id);
            }
        }
    }
}

async fn run_idle_decay(inner: Arc<Inner>) {
    let mut interval = tokio::time::interval(inner.config.idle_timeout / 4);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let mut state = inner.state.lock().await;

        if state.workers.len() <= inner.config.min_workers() {
            continue;
        }

        let idle_timeout = inner.config.idle_timeout;
        let min_workers = inner.config.min_workers();
        let now = Instant::now();

        let decayable: Vec<WorkerId> = state
            .workers
            .iter()
            .filter(|(_, handle)| {
                !handle.busy
                    && handle
                        .idle_since
                        .is_some_and(|since| now.duration_since(since) >= idle_timeout)
            })
            .map(|(&id, _)| id)
            .collect();

        for id in decayable {
            if state.workers.len() <= min_workers {
                break;
            }
            if let Some(handle) = state.workers.remove(&id) {
                let _ = handle.sender.send(WorkerCommand::Shutdown);
            }
        }
    }
}
