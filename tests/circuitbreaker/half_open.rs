use std::time::Duration;
use ytsize_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use ytsize_core::CoreErrorCode;

use super::{classify, fail, succeed};

fn breaker() -> CircuitBreaker {
    CircuitBreaker::new(
        CircuitBreakerConfig::builder()
            .failure_threshold(1)
            .volume_threshold(1)
            .wait_duration_in_open(Duration::from_millis(50))
            .permitted_calls_in_half_open(1)
            .success_threshold(2)
            .build(),
    )
}

#[tokio::test]
async fn half_open_closes_only_after_two_consecutive_successes() {
    let cb = breaker();
    cb.force_open();
    assert_eq!(cb.state_sync(), CircuitState::Open);

    tokio::time::sleep(Duration::from_millis(60)).await;

    let _ = cb.execute(succeed, classify).await;
    assert_eq!(cb.state_sync(), CircuitState::HalfOpen, "one success is below the configured threshold of 2");

    let _ = cb.execute(succeed, classify).await;
    assert_eq!(cb.state_sync(), CircuitState::Closed);
}

#[tokio::test]
async fn a_failure_while_half_open_reopens_and_resets_the_success_streak() {
    let cb = breaker();
    cb.force_open();
    tokio::time::sleep(Duration::from_millis(60)).await;

    let _ = cb.execute(succeed, classify).await;
    assert_eq!(cb.state_sync(), CircuitState::HalfOpen);

    let _ = cb.execute(move || fail(CoreErrorCode::Unknown), classify).await;
    assert_eq!(cb.state_sync(), CircuitState::Open);
}
