mod config;
mod error;
mod server;
mod size;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use server::AppState;
use ytsize_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig};
use ytsize_executor::{SubprocessConfig, SubprocessExecutor};
use ytsize_lifecycle::{LifecycleConfig, LifecycleController};
use ytsize_ratelimiter::{RateLimiter, RateLimiterConfig};
use ytsize_workerpool::{WorkerPool, WorkerPoolConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration, refusing to start");
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Startup order: config already validated above, then RL (non-fatal if
    // its backend can't connect), then CB, then WP, then the HTTP acceptor.
    let rate_limiter_config = RateLimiterConfig::builder()
        .window(config.rate_limit_window)
        .max_requests(config.rate_limit_max_requests)
        .bypass(config.rate_limit_bypass)
        .on_event(|event| tracing::debug!(?event, "rate limiter event"))
        .build();

    let rate_limiter = Arc::new(if config.redis_enabled {
        match &config.redis_url {
            Some(url) => RateLimiter::connect(url, rate_limiter_config).await,
            None => RateLimiter::local_only(rate_limiter_config),
        }
    } else {
        RateLimiter::local_only(rate_limiter_config)
    });

    let circuit_breaker = Arc::new(CircuitBreaker::new(
        CircuitBreakerConfig::builder()
            .failure_threshold(config.circuit_failure_threshold)
            .volume_threshold(config.circuit_volume_threshold)
            .wait_duration_in_open(config.circuit_wait_duration_in_open)
            .success_threshold(config.circuit_success_threshold)
            .on_event(|event| tracing::debug!(?event, "circuit breaker event"))
            .build(),
    ));

    let executor = SubprocessExecutor::new(
        SubprocessConfig::builder()
            .ytdlp_path(config.ytdlp_path.clone())
            .default_timeout(config.ytdlp_timeout)
            .max_output_bytes(config.ytdlp_max_buffer)
            .build(),
    );

    let worker_pool = Arc::new(AsyncMutex::new(WorkerPool::new(
        WorkerPoolConfig::builder()
            .min_workers(config.min_workers)
            .max_workers(config.max_workers)
            .max_queue_size(config.max_queue_size)
            .max_tasks_per_worker(config.max_tasks_per_worker)
            .idle_timeout(config.worker_idle)
            .task_timeout_buffer(config.task_buffer)
            .on_event(|event| tracing::debug!(?event, "worker pool event"))
            .build(),
        executor,
    )));

    let lifecycle = Arc::new(LifecycleController::new(
        Arc::downgrade(&worker_pool),
        Arc::downgrade(&circuit_breaker),
        Arc::downgrade(&rate_limiter),
        LifecycleConfig::builder()
            .shutdown_grace(config.shutdown_grace)
            .on_event(|event| tracing::info!(?event, "lifecycle event"))
            .build(),
    ));

    let state = Arc::new(AppState {
        config,
        rate_limiter,
        circuit_breaker,
        worker_pool,
        lifecycle: Arc::clone(&lifecycle),
    });

    let app = server::router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "failed to bind listener");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "ytsize-server listening");

    let shutdown_task = tokio::spawn(lifecycle.clone().run_until_signal());

    let serve = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(wait_for_drain(Arc::clone(&lifecycle)));

    if let Err(err) = serve.await {
        tracing::error!(error = %err, "server exited with an error");
    }

    // The listener has stopped accepting; wait for the rest of the shutdown
    // sequence (worker pool drain, rate limiter quit, telemetry flush) to
    // finish before the process exits.
    let _ = shutdown_task.await;
}

async fn wait_for_drain(lifecycle: Arc<LifecycleController>) {
    lifecycle.cancellation_token().cancelled().await;
}
