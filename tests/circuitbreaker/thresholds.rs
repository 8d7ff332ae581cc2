use std::time::Duration;
use ytsize_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use ytsize_core::CoreErrorCode;

use super::{classify, fail, succeed};

fn breaker(failure_threshold: usize, volume_threshold: usize) -> CircuitBreaker {
    CircuitBreaker::new(
        CircuitBreakerConfig::builder()
            .failure_threshold(failure_threshold)
            .volume_threshold(volume_threshold)
            .wait_duration_in_open(Duration::from_secs(60))
            .build(),
    )
}

#[tokio::test]
async fn failures_below_volume_threshold_do_not_open_the_circuit() {
    let cb = breaker(3, 5);

    for _ in 0..3 {
        let _ = cb.execute(move || fail(CoreErrorCode::VideoUnavailable), classify).await;
    }

    assert_eq!(
        cb.state_sync(),
        CircuitState::Closed,
        "failure_threshold alone does not open the circuit below volume_threshold"
    );
}

#[tokio::test]
async fn both_failure_and_volume_thresholds_are_required_to_open() {
    let cb = breaker(3, 5);

    let _ = cb.execute(succeed, classify).await;
    let _ = cb.execute(succeed, classify).await;
    for _ in 0..3 {
        let _ = cb.execute(move || fail(CoreErrorCode::VideoUnavailable), classify).await;
    }

    assert_eq!(cb.state_sync(), CircuitState::Open);
}
