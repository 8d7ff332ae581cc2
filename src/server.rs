//! HTTP surface: one size-estimation route and a health check. Wires the
//! rate limiter, circuit breaker, worker pool, and lifecycle controller
//! together around the single admission path: RL gates by client, CB gates
//! by upstream health, WP queues and runs the subprocess, `size` turns its
//! output into bytes.

use crate::config::AppConfig;
use crate::error::{ApiError, RateLimitedResponse};
use crate::size::{self, SizeEstimate};

use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use ytsize_circuitbreaker::{CircuitBreaker, CircuitBreakerError};
use ytsize_core::CoreErrorCode;
use ytsize_executor::ExecutorError;
use ytsize_lifecycle::LifecycleController;
use ytsize_ratelimiter::RateLimiter;
use ytsize_workerpool::{Task, WorkerPool, WorkerPoolError};

pub struct AppState {
    pub config: AppConfig,
    pub rate_limiter: Arc<RateLimiter>,
    pub circuit_breaker: Arc<CircuitBreaker>,
    pub worker_pool: Arc<AsyncMutex<WorkerPool>>,
    pub lifecycle: Arc<LifecycleController>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/size", post(estimate_size))
        .route("/healthz", get(health))
        .with_state(state)
}

#[derive(Deserialize)]
struct SizeRequest {
    url: String,
}

#[derive(Serialize)]
struct SizeResponse {
    ok: bool,
    #[serde(rename = "requestId")]
    request_id: String,
    #[serde(flatten)]
    estimate: SizeEstimateBody,
}

#[derive(Serialize)]
struct SizeEstimateBody {
    duration: u64,
    bytes: std::collections::BTreeMap<String, u64>,
    human: std::collections::BTreeMap<String, String>,
}

impl From<SizeEstimate> for SizeEstimateBody {
    fn from(estimate: SizeEstimate) -> Self {
        Self {
            duration: estimate.duration,
            bytes: estimate.bytes,
            human: estimate.human,
        }
    }
}

async fn estimate_size(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<SizeRequest>,
) -> axum::response::Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let _connection = state.lifecycle.track_connection();

    if state.lifecycle.state() != ytsize_lifecycle::LifecycleState::Running {
        return ApiError::new(CoreErrorCode::ShuttingDown, "server is shutting down", request_id)
            .into_response();
    }

    if let Err(rejected) = state.rate_limiter.check(&addr.ip().to_string()).await {
        return RateLimitedResponse {
            retry_after_secs: rejected.retry_after.as_secs(),
            request_id,
        }
        .into_response();
    }

    if let Err(err) = ytsize_core::validate_youtube_url(&request.url) {
        return ApiError::new(err.code(), err.to_string(), request_id).into_response();
    }

    match dispatch_with_retry(&state, &request.url, state.config.max_retries).await {
        Ok(output) => match size::compute_sizes(&output.metadata_json, None) {
            Ok(estimate) => Json(SizeResponse {
                ok: true,
                request_id,
                estimate: estimate.into(),
            })
            .into_response(),
            Err(err) => ApiError::new(CoreErrorCode::Unknown, err.to_string(), request_id).into_response(),
        },
        Err(DispatchFailure::CircuitOpen) => {
            ApiError::new(CoreErrorCode::CircuitOpen, "upstream circuit is open", request_id).into_response()
        }
        Err(DispatchFailure::Pool(err)) => {
            ApiError::new(err.code(), err.to_string(), request_id).into_response()
        }
        Err(DispatchFailure::Executor(err)) => {
            ApiError::new(err.code, err.to_string(), request_id).into_response()
        }
        Err(DispatchFailure::WorkerDropped) => ApiError::new(
            CoreErrorCode::WorkerError,
            "worker dropped the task without reporting a result",
            request_id,
        )
        .into_response(),
    }
}

enum DispatchFailure {
    CircuitOpen,
    Pool(WorkerPoolError),
    Executor(ExecutorError),
    WorkerDropped,
}

/// Dispatches `url` through the circuit breaker and worker pool, retrying a
/// fresh [`Task`] with capped exponential backoff when the executor reports a
/// retryable [`CoreErrorCode`] (`NETWORK_ERROR`/`UNKNOWN`). Rejections from
/// the circuit breaker or worker pool itself (open circuit, full queue,
/// shutdown) are not retried — only the subprocess outcome is.
async fn dispatch_with_retry(
    state: &AppState,
    url: &str,
    max_retries: u32,
) -> Result<ytsize_executor::ExecutorOutput, DispatchFailure> {
    let mut attempt = 0u32;

    loop {
        let (mut task, receiver) = Task::new(
            url,
            state.config.ytdlp_timeout,
            state.config.ytdlp_max_buffer,
            None,
        );
        task.retry_attempt = attempt;

        let worker_pool = Arc::clone(&state.worker_pool);
        let dispatch_result = state
            .circuit_breaker
            .execute(
                move || async move {
                    let pool = worker_pool.lock().await;
                    pool.dispatch(task).await
                },
                |err: &WorkerPoolError| err.code(),
            )
            .await;

        if let Err(err) = dispatch_result {
            return Err(match err {
                CircuitBreakerError::OpenCircuit => DispatchFailure::CircuitOpen,
                CircuitBreakerError::Inner(inner) => DispatchFailure::Pool(inner),
            });
        }

        let outcome = match receiver.await {
            Ok(Ok(output)) => return Ok(output),
            Ok(Err(executor_err)) => executor_err,
            Err(_) => return Err(DispatchFailure::WorkerDropped),
        };

        if attempt >= max_retries || !outcome.code.is_retryable() {
            return Err(DispatchFailure::Executor(outcome));
        }

        let backoff_ms = 1000u64.saturating_mul(1u64 << attempt).min(5000);
        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        attempt += 1;
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    state: &'static str,
    #[serde(rename = "circuitState")]
    circuit_state: &'static str,
    #[serde(rename = "rateLimiterBackend")]
    rate_limiter_backend: &'static str,
    #[serde(rename = "rateLimiterDegraded")]
    rate_limiter_degraded: bool,
    #[serde(rename = "workerPool")]
    worker_pool: WorkerPoolStats,
}

#[derive(Serialize)]
struct WorkerPoolStats {
    #[serde(rename = "activeWorkers")]
    active_workers: usize,
    #[serde(rename = "queueLength")]
    queue_length: usize,
    #[serde(rename = "activeTasks")]
    active_tasks: usize,
    #[serde(rename = "totalTasks")]
    total_tasks: u64,
    #[serde(rename = "completedTasks")]
    completed_tasks: u64,
    #[serde(rename = "failedTasks")]
    failed_tasks: u64,
    #[serde(rename = "workersCreated")]
    workers_created: u64,
    #[serde(rename = "workersDestroyed")]
    workers_destroyed: u64,
    #[serde(rename = "peakWorkers")]
    peak_workers: usize,
}

impl From<ytsize_workerpool::PoolStats> for WorkerPoolStats {
    fn from(stats: ytsize_workerpool::PoolStats) -> Self {
        Self {
            active_workers: stats.active_workers,
            queue_length: stats.queue_length,
            active_tasks: stats.active_tasks,
            total_tasks: stats.total_tasks,
            completed_tasks: stats.completed_tasks,
            failed_tasks: stats.failed_tasks,
            workers_created: stats.workers_created,
            workers_destroyed: stats.workers_destroyed,
            peak_workers: stats.peak_workers,
        }
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    use ytsize_circuitbreaker::CircuitState;
    use ytsize_lifecycle::LifecycleState;
    use ytsize_ratelimiter::BackendMode;

    let lifecycle_state = match state.lifecycle.state() {
        LifecycleState::Running => "running",
        LifecycleState::Draining => "draining",
        LifecycleState::Terminated => "terminated",
    };
    let circuit_state = match state.circuit_breaker.state_sync() {
        CircuitState::Closed => "closed",
        CircuitState::Open => "open",
        CircuitState::HalfOpen => "half_open",
    };
    let backend_mode = match state.rate_limiter.backend_mode().await {
        BackendMode::Distributed => "distributed",
        BackendMode::Local => "local",
    };
    let worker_pool_stats = state.worker_pool.lock().await.stats().await;

    Json(HealthResponse {
        ok: lifecycle_state == "running",
        state: lifecycle_state,
        circuit_state,
        rate_limiter_backend: backend_mode,
        rate_limiter_degraded: state.rate_limiter.is_degraded(),
        worker_pool: worker_pool_stats.into(),
    })
}
