use std::time::Duration;
use ytsize_ratelimiter::{RateLimiter, RateLimiterConfig};

#[tokio::test]
async fn admits_up_to_max_requests_then_rejects() {
    let limiter = RateLimiter::local_only(
        RateLimiterConfig::builder()
            .max_requests(2)
            .window(Duration::from_secs(60))
            .build(),
    );

    assert!(limiter.check("client-a").await.is_ok());
    assert!(limiter.check("client-a").await.is_ok());

    let rejected = limiter.check("client-a").await;
    assert!(rejected.is_err());
}

#[tokio::test]
async fn clients_are_tracked_independently() {
    let limiter = RateLimiter::local_only(
        RateLimiterConfig::builder()
            .max_requests(1)
            .window(Duration::from_secs(60))
            .build(),
    );

    assert!(limiter.check("client-a").await.is_ok());
    assert!(limiter.check("client-a").await.is_err());
    assert!(limiter.check("client-b").await.is_ok(), "a different client has its own window");
}

#[tokio::test]
async fn the_window_resets_admission_once_it_elapses() {
    let limiter = RateLimiter::local_only(
        RateLimiterConfig::builder()
            .max_requests(1)
            .window(Duration::from_millis(30))
            .build(),
    );

    assert!(limiter.check("client-a").await.is_ok());
    assert!(limiter.check("client-a").await.is_err());

    tokio::time::sleep(Duration::from_millis(40)).await;

    assert!(limiter.check("client-a").await.is_ok());
}

#[tokio::test]
async fn bypass_admits_every_request_regardless_of_the_limit() {
    let limiter = RateLimiter::local_only(
        RateLimiterConfig::builder()
            .max_requests(1)
            .window(Duration::from_secs(60))
            .bypass(true)
            .build(),
    );

    for _ in 0..10 {
        assert!(limiter.check("client-a").await.is_ok());
    }
}
