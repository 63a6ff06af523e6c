//! Tests for bounded linear retry

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use mcol_application::{RetryPolicy, retry_with_backoff};
use mcol_domain::error::Error;
use tokio_util::sync::CancellationToken;

fn policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(10))
}

#[tokio::test]
async fn test_always_failing_makes_exactly_three_attempts() {
    let calls = AtomicU32::new(0);
    let cancel = CancellationToken::new();

    let result: Result<Option<()>, Error> = retry_with_backoff(&policy(), &cancel, |attempt| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { Err(Error::network(format!("attempt {attempt} failed"))) }
    })
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    match result {
        Err(Error::Network { message, .. }) => assert_eq!(message, "attempt 3 failed"),
        other => panic!("expected last error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_success_on_second_call_stops_retrying() {
    let calls = AtomicU32::new(0);
    let cancel = CancellationToken::new();

    let result = retry_with_backoff(&policy(), &cancel, |attempt| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt < 2 {
                Err(Error::network("not yet"))
            } else {
                Ok(attempt)
            }
        }
    })
    .await;

    assert_eq!(result.ok(), Some(Some(2)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_pauses_grow_linearly() {
    let cancel = CancellationToken::new();
    let started = Instant::now();

    let _ = retry_with_backoff(&policy(), &cancel, |_| async {
        Err::<(), _>(Error::network("down"))
    })
    .await;

    // 10ms after the first failure, 20ms after the second, none after the last
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[tokio::test]
async fn test_cancellation_mid_backoff_returns_ok() {
    let calls = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();
    let slow = RetryPolicy::new(5, Duration::from_secs(30));

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let counter = Arc::clone(&calls);
    let result = retry_with_backoff(&slow, &cancel, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Err::<(), _>(Error::network("down")) }
    })
    .await;

    assert!(matches!(result, Ok(None)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_before_start_makes_no_attempt() {
    let calls = AtomicU32::new(0);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = retry_with_backoff(&policy(), &cancel, |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok(()) }
    })
    .await;

    assert!(matches!(result, Ok(None)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_delay_after_attempt() {
    let policy = policy();
    assert_eq!(policy.delay_after(1), Duration::from_millis(10));
    assert_eq!(policy.delay_after(3), Duration::from_millis(30));
}
