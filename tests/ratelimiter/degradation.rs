use std::time::Duration;
use ytsize_ratelimiter::{BackendMode, RateLimiter, RateLimiterConfig};

#[tokio::test(start_paused = true)]
async fn an_unreachable_distributed_backend_falls_back_to_local_mode() {
    let limiter = RateLimiter::connect(
        "redis://127.0.0.1:1",
        RateLimiterConfig::builder()
            .max_requests(5)
            .window(Duration::from_secs(60))
            .build(),
    )
    .await;

    assert_eq!(limiter.backend_mode().await, BackendMode::Local);
    assert!(limiter.is_degraded());

    // The limiter still admits requests in local mode rather than rejecting
    // admissions because of the backend outage.
    assert!(limiter.check("client-a").await.is_ok());
}

#[tokio::test]
async fn local_only_mode_is_not_reported_as_degraded() {
    let limiter = RateLimiter::local_only(
        RateLimiterConfig::builder()
            .max_requests(5)
            .window(Duration::from_secs(60))
            .build(),
    );

    assert_eq!(limiter.backend_mode().await, BackendMode::Local);
    assert!(!limiter.is_degraded(), "starting in local-only mode by configuration is not a degradation");
}
