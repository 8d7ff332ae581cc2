use std::time::Duration;
use ytsize_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use ytsize_core::CoreErrorCode;

use super::{classify, fail};

#[tokio::test]
async fn three_consecutive_critical_failures_open_the_circuit_regardless_of_volume() {
    let cb = CircuitBreaker::new(
        CircuitBreakerConfig::builder()
            .failure_threshold(50)
            .volume_threshold(50)
            .wait_duration_in_open(Duration::from_secs(60))
            .build(),
    );

    for _ in 0..3 {
        let _ = cb.execute(move || fail(CoreErrorCode::NetworkError), classify).await;
    }

    assert_eq!(
        cb.state_sync(),
        CircuitState::Open,
        "three consecutive critical-coded failures trip the fast path well below the 50/50 thresholds"
    );
}

#[tokio::test]
async fn a_non_critical_failure_between_critical_ones_resets_the_streak() {
    let cb = CircuitBreaker::new(
        CircuitBreakerConfig::builder()
            .failure_threshold(50)
            .volume_threshold(50)
            .wait_duration_in_open(Duration::from_secs(60))
            .build(),
    );

    let _ = cb.execute(move || fail(CoreErrorCode::NetworkError), classify).await;
    let _ = cb.execute(move || fail(CoreErrorCode::NetworkError), classify).await;
    let _ = cb.execute(move || fail(CoreErrorCode::VideoUnavailable), classify).await;
    let _ = cb.execute(move || fail(CoreErrorCode::NetworkError), classify).await;
    let _ = cb.execute(move || fail(CoreErrorCode::NetworkError), classify).await;

    assert_eq!(
        cb.state_sync(),
        CircuitState::Closed,
        "the non-critical failure breaks the run of three consecutive critical failures"
    );
}
