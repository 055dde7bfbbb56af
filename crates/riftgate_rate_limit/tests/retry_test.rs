//! Tests for the bounded polling backoff.

use riftgate_error::{
    LastOutcome, RetryErrorKind, RiftgateError, RiftgateErrorKind, UpstreamError,
    UpstreamErrorKind,
};
use riftgate_rate_limit::{CancelSignal, ProbeOutcome, RetryPolicy, absent_on_not_found};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;

fn upstream(kind: UpstreamErrorKind) -> RiftgateError {
    UpstreamError::new(kind).into()
}

fn retry_kind(err: &RiftgateError) -> &RetryErrorKind {
    match err.kind() {
        RiftgateErrorKind::Retry(e) => e.kind(),
        other => panic!("Expected retry error, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_returns_value_after_three_not_ready() {
    let policy = RetryPolicy::new(10, Duration::from_millis(100), Duration::from_secs(30));
    let calls = Mutex::new(Vec::new());

    let value = policy
        .retry(|| {
            let mut calls = calls.lock().unwrap();
            calls.push(Instant::now());
            let n = calls.len();
            async move {
                if n < 4 {
                    Ok(ProbeOutcome::NotReady)
                } else {
                    Ok(ProbeOutcome::Ready("live"))
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, "live");
    let calls = calls.into_inner().unwrap();
    assert_eq!(calls.len(), 4);

    let gaps: Vec<_> = calls.windows(2).map(|w| w[1] - w[0]).collect();
    assert_eq!(
        gaps,
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(400),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_jittered_delays_stay_within_bounds() {
    let policy = RetryPolicy::new(6, Duration::from_millis(100), Duration::from_millis(500))
        .with_jitter_ceiling(Duration::from_millis(50));
    let calls = Mutex::new(Vec::new());

    let result: Result<(), _> = policy
        .retry(|| {
            calls.lock().unwrap().push(Instant::now());
            async { Ok(ProbeOutcome::NotReady) }
        })
        .await;
    assert!(result.is_err());

    let calls = calls.into_inner().unwrap();
    for (i, gap) in calls.windows(2).map(|w| w[1] - w[0]).enumerate() {
        let floor = Duration::from_millis(100 * 2u64.pow(i as u32)).min(Duration::from_millis(500));
        assert!(gap >= floor, "gap {:?} below {:?}", gap, floor);
        assert!(gap <= Duration::from_millis(500), "gap {:?} above cap", gap);
    }
}

#[tokio::test(start_paused = true)]
async fn test_exhausts_after_exactly_max_attempts() {
    let policy = RetryPolicy::new(5, Duration::from_millis(10), Duration::from_secs(1));
    let calls = AtomicU32::new(0);

    let err = policy
        .retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<ProbeOutcome<()>, RiftgateError>(ProbeOutcome::NotReady) }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert_eq!(
        retry_kind(&err),
        &RetryErrorKind::Exhausted {
            attempts: 5,
            last: LastOutcome::NotReady
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_unauthorized_propagates_immediately() {
    let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(30));
    let calls = AtomicU32::new(0);
    let start = Instant::now();

    let err = policy
        .retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<ProbeOutcome<()>, _>(upstream(UpstreamErrorKind::Unauthorized)) }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(Instant::now(), start);
    assert_eq!(err.upstream_kind(), Some(&UpstreamErrorKind::Unauthorized));
}

#[tokio::test(start_paused = true)]
async fn test_server_errors_follow_backoff_path() {
    let policy = RetryPolicy::new(10, Duration::from_millis(100), Duration::from_secs(30));
    let calls = AtomicU32::new(0);

    let value = policy
        .retry(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n <= 2 {
                    Err(upstream(UpstreamErrorKind::UpstreamServerError { status: 503 }))
                } else {
                    Ok(ProbeOutcome::Ready(n))
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, 3);
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_carries_last_failure() {
    let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_secs(1));

    let err = policy
        .retry(|| async {
            Err::<ProbeOutcome<()>, _>(upstream(UpstreamErrorKind::UpstreamServerError {
                status: 502,
            }))
        })
        .await
        .unwrap_err();

    assert_eq!(
        retry_kind(&err),
        &RetryErrorKind::Exhausted {
            attempts: 3,
            last: LastOutcome::Failed(UpstreamErrorKind::UpstreamServerError { status: 502 })
        }
    );
    assert_eq!(
        err.upstream_kind(),
        Some(&UpstreamErrorKind::UpstreamServerError { status: 502 })
    );
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_honours_retry_after() {
    let policy = RetryPolicy::new(3, Duration::from_millis(100), Duration::from_secs(30));
    let calls = Mutex::new(Vec::new());

    let value = policy
        .retry(|| {
            let mut calls = calls.lock().unwrap();
            calls.push(Instant::now());
            let first = calls.len() == 1;
            async move {
                if first {
                    Err(upstream(UpstreamErrorKind::RateLimited {
                        retry_after: Some(Duration::from_secs(2)),
                    }))
                } else {
                    Ok(ProbeOutcome::Ready(()))
                }
            }
        })
        .await;

    assert!(value.is_ok());
    let calls = calls.into_inner().unwrap();
    assert_eq!(calls[1] - calls[0], Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_not_found_maps_to_not_ready() {
    let policy = RetryPolicy::new(4, Duration::from_millis(10), Duration::from_secs(1));
    let calls = AtomicU32::new(0);

    let value = policy
        .retry(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                let lookup: Result<u32, RiftgateError> = if n < 3 {
                    Err(upstream(UpstreamErrorKind::NotFound))
                } else {
                    Ok(42)
                };
                absent_on_not_found(lookup)
            }
        })
        .await
        .unwrap();

    assert_eq!(value, 42);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_first_attempt() {
    let policy = RetryPolicy::default();
    let (handle, signal) = CancelSignal::pair();
    handle.cancel();
    let calls = AtomicU32::new(0);

    let err = policy
        .retry_with_cancel(&signal, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<ProbeOutcome<()>, RiftgateError>(ProbeOutcome::NotReady) }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(retry_kind(&err), &RetryErrorKind::Cancelled { attempts: 0 });
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff_stops_promptly() {
    let policy = RetryPolicy::new(10, Duration::from_secs(10), Duration::from_secs(60));
    let (handle, signal) = CancelSignal::pair();
    let calls = AtomicU32::new(0);
    let start = Instant::now();

    let poll = policy.retry_with_cancel(&signal, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok::<ProbeOutcome<()>, RiftgateError>(ProbeOutcome::NotReady) }
    });
    let cancel = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.cancel();
    };

    let (result, ()) = tokio::join!(poll, cancel);
    let err = result.unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(retry_kind(&err), &RetryErrorKind::Cancelled { attempts: 1 });
    assert_eq!(Instant::now() - start, Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_zero_attempt_policy_still_runs_probe_once() {
    let policy = RetryPolicy::new(0, Duration::from_millis(10), Duration::from_secs(1));
    let calls = AtomicU32::new(0);
    let start = Instant::now();

    let err = policy
        .retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<ProbeOutcome<()>, RiftgateError>(ProbeOutcome::NotReady) }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(Instant::now(), start);
    assert_eq!(
        retry_kind(&err),
        &RetryErrorKind::Exhausted {
            attempts: 1,
            last: LastOutcome::NotReady
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_inner_retry_is_not_retried_again() {
    let inner = RetryPolicy::new(2, Duration::from_millis(10), Duration::from_secs(1));
    let outer = RetryPolicy::new(5, Duration::from_millis(10), Duration::from_secs(1));
    let calls = AtomicU32::new(0);

    let err = outer
        .retry(|| {
            let calls = &calls;
            let inner = &inner;
            async move {
                inner
                    .retry(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        async {
                            Err::<ProbeOutcome<()>, _>(upstream(
                                UpstreamErrorKind::UpstreamServerError { status: 503 },
                            ))
                        }
                    })
                    .await
                    .map(ProbeOutcome::Ready)
            }
        })
        .await
        .unwrap_err();

    // The outer loop gives up after the first exhausted inner run.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(matches!(
        retry_kind(&err),
        RetryErrorKind::Exhausted { attempts: 2, .. }
    ));
}
