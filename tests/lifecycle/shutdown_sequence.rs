use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use ytsize_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig};
use ytsize_core::CoreErrorCode;
use ytsize_lifecycle::{LifecycleConfig, LifecycleController, LifecycleEvent, LifecycleState};
use ytsize_ratelimiter::{BackendMode, RateLimiter, RateLimiterConfig};
use ytsize_workerpool::{Task, WorkerPool, WorkerPoolConfig, WorkerPoolError};

fn missing_executable() -> ytsize_executor::SubprocessExecutor {
    ytsize_executor::SubprocessExecutor::new(
        ytsize_executor::SubprocessConfig::builder()
            .ytdlp_path("/nonexistent/definitely-not-yt-dlp")
            .build(),
    )
}

#[tokio::test]
async fn shutdown_leaves_the_worker_pool_rejecting_new_dispatches() {
    let pool = Arc::new(AsyncMutex::new(WorkerPool::new(
        WorkerPoolConfig::builder().build(),
        missing_executable(),
    )));
    let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig::builder().build()));
    let limiter = Arc::new(RateLimiter::local_only(RateLimiterConfig::builder().build()));

    let config = LifecycleConfig::builder()
        .connection_drain_deadline(Duration::from_millis(1))
        .telemetry_flush_deadline(Duration::from_millis(1))
        .build();

    let controller = LifecycleController::new(
        Arc::downgrade(&pool),
        Arc::downgrade(&breaker),
        Arc::downgrade(&limiter),
        config,
    );

    controller.shutdown().await;
    assert_eq!(controller.state(), LifecycleState::Terminated);

    let (task, _receiver) = Task::new("https://example.com/video", Duration::from_secs(5), 1_000_000, None);
    let rejected = pool.lock().await.dispatch(task).await;
    assert!(matches!(rejected, Err(WorkerPoolError::ShuttingDown)));
}

#[tokio::test]
async fn shutdown_closes_the_rate_limiters_backend_connection() {
    let config = LifecycleConfig::builder()
        .connection_drain_deadline(Duration::from_millis(1))
        .telemetry_flush_deadline(Duration::from_millis(1))
        .build();

    let limiter = Arc::new(RateLimiter::local_only(RateLimiterConfig::builder().build()));
    assert_eq!(limiter.backend_mode().await, BackendMode::Local);

    let controller = LifecycleController::new(Weak::new(), Weak::new(), Arc::downgrade(&limiter), config);

    // quit() on a local-only limiter is a no-op, but it must still be reached
    // and awaited rather than skipped as part of the sequence.
    controller.shutdown().await;
    assert_eq!(controller.state(), LifecycleState::Terminated);
    assert_eq!(limiter.backend_mode().await, BackendMode::Local);
}

#[tokio::test]
async fn the_cancellation_token_fires_before_connections_are_drained() {
    let config = LifecycleConfig::builder()
        .connection_drain_deadline(Duration::from_millis(200))
        .telemetry_flush_deadline(Duration::from_millis(1))
        .build();
    let controller = Arc::new(LifecycleController::new(Weak::new(), Weak::new(), Weak::new(), config));

    let guard = controller.track_connection();
    let token = controller.cancellation_token();
    assert!(!token.is_cancelled());

    let controller_clone = Arc::clone(&controller);
    let shutdown = tokio::spawn(async move { controller_clone.shutdown().await });

    // The token cancels as soon as draining starts, well before the
    // connection-drain deadline or the held guard is dropped.
    token.cancelled().await;
    assert_eq!(controller.state(), LifecycleState::Draining);
    assert_eq!(controller.active_connection_count(), 1);

    drop(guard);
    shutdown.await.unwrap();
    assert_eq!(controller.state(), LifecycleState::Terminated);
}

#[tokio::test]
async fn a_second_connection_outlasting_the_drain_deadline_does_not_block_termination() {
    let config = LifecycleConfig::builder()
        .connection_drain_deadline(Duration::from_millis(20))
        .telemetry_flush_deadline(Duration::from_millis(1))
        .build();
    let controller = LifecycleController::new(Weak::new(), Weak::new(), Weak::new(), config);

    let _guard = controller.track_connection();

    let deadline_events = Arc::new(AtomicUsize::new(0));
    let deadline_events_clone = Arc::clone(&deadline_events);
    let config = LifecycleConfig::builder()
        .connection_drain_deadline(Duration::from_millis(20))
        .telemetry_flush_deadline(Duration::from_millis(1))
        .on_event(move |event| {
            if matches!(event, LifecycleEvent::DeadlineExceeded { step, .. } if *step == "drain_connections") {
                deadline_events_clone.fetch_add(1, Ordering::SeqCst);
            }
        })
        .build();
    let controller_with_listener = LifecycleController::new(Weak::new(), Weak::new(), Weak::new(), config);
    let _held = controller_with_listener.track_connection();

    controller.shutdown().await;
    assert_eq!(controller.state(), LifecycleState::Terminated);

    controller_with_listener.shutdown().await;
    assert_eq!(controller_with_listener.state(), LifecycleState::Terminated);
    assert_eq!(deadline_events.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn a_breaker_forced_open_before_shutdown_is_still_observable_afterwards() {
    let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig::builder().build()));
    breaker.force_open();

    let config = LifecycleConfig::builder()
        .connection_drain_deadline(Duration::from_millis(1))
        .telemetry_flush_deadline(Duration::from_millis(1))
        .build();
    let controller = LifecycleController::new(Weak::new(), Arc::downgrade(&breaker), Weak::new(), config);

    controller.shutdown().await;

    let result = breaker
        .execute(|| async { Ok::<_, CoreErrorCode>(()) }, |code: &CoreErrorCode| *code)
        .await;
    assert!(result.is_err(), "a breaker forced open before shutdown stays open afterwards");
}
