//! Bounded exponential backoff with jitter for polling probes.
//!
//! A probe is any async closure that asks the upstream service whether some
//! precondition holds yet ("is the player in a live match?"). The probe's
//! contract is explicit: it answers [`ProbeOutcome::Ready`] with a value,
//! [`ProbeOutcome::NotReady`] when the precondition is not met, or an error.
//! Errors classified as retryable take the same backoff path as `NotReady`;
//! every other error stops the loop at once.

use crate::{CancelSignal, RetryConfig};
use riftgate_error::{
    LastOutcome, RetryError, RetryErrorKind, RetryableError, RiftgateResult, UpstreamErrorKind,
};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Answer of one probe invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome<T> {
    /// The precondition holds; stop polling with this value
    Ready(T),
    /// The precondition does not hold yet; keep polling
    NotReady,
}

/// Map an upstream "not found" answer to [`ProbeOutcome::NotReady`].
///
/// For polling lookups such as "is there a live match" a 404 is the normal
/// not-yet answer rather than an error.
///
/// # Example
///
/// ```
/// use riftgate_error::{RiftgateResult, UpstreamError, UpstreamErrorKind};
/// use riftgate_rate_limit::{absent_on_not_found, ProbeOutcome};
///
/// let missing: RiftgateResult<u32> = Err(UpstreamError::new(UpstreamErrorKind::NotFound).into());
/// assert_eq!(absent_on_not_found(missing).unwrap(), ProbeOutcome::NotReady);
/// ```
pub fn absent_on_not_found<T>(result: RiftgateResult<T>) -> RiftgateResult<ProbeOutcome<T>> {
    match result {
        Ok(value) => Ok(ProbeOutcome::Ready(value)),
        Err(e) if e.upstream_kind().is_some_and(UpstreamErrorKind::is_not_found) => {
            Ok(ProbeOutcome::NotReady)
        }
        Err(e) => Err(e),
    }
}

/// How a single attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Usable value returned
    Ready,
    /// Precondition not met yet
    NotReady,
    /// Retryable upstream failure
    Retryable(UpstreamErrorKind),
    /// Non-retryable failure, propagated to the caller
    Fatal,
}

/// Record of one polling attempt, emitted to the trace log.
///
/// Every attempt produces exactly one record. `delay` is `None` when no
/// further attempt follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAttempt {
    /// 1-indexed attempt number
    pub attempt: u32,
    /// Sleep before the next attempt, if there is one
    pub delay: Option<Duration>,
    /// What the probe answered
    pub outcome: AttemptOutcome,
}

/// Bounded exponential backoff policy.
///
/// On attempt `k` a not-ready answer is followed by a sleep of
/// `min(max_delay, base_delay * 2^(k-1) + jitter)`, where jitter is drawn
/// uniformly from `[0, jitter_ceiling)`.
///
/// # Example
///
/// ```rust,ignore
/// use riftgate_rate_limit::{absent_on_not_found, RetryPolicy};
///
/// let policy = RetryPolicy::default();
/// let game = policy
///     .retry(|| async { absent_on_not_found(client.current_game(&puuid).await) })
///     .await?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter_ceiling: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter_ceiling: Duration::from_millis(config.jitter_ceiling_ms),
        }
    }
}

impl RetryPolicy {
    /// Create a policy without jitter.
    ///
    /// The probe always runs at least once; `max_attempts` of zero counts as one.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            jitter_ceiling: Duration::ZERO,
        }
    }

    /// Set the exclusive upper bound of the per-attempt jitter.
    pub fn with_jitter_ceiling(mut self, jitter_ceiling: Duration) -> Self {
        self.jitter_ceiling = jitter_ceiling;
        self
    }

    /// Maximum number of probe invocations.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after attempt `attempt` for a given jitter sample.
    ///
    /// # Example
    ///
    /// ```
    /// use riftgate_rate_limit::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(30));
    /// assert_eq!(policy.backoff_delay(1, Duration::ZERO), Duration::from_secs(1));
    /// assert_eq!(policy.backoff_delay(3, Duration::from_millis(250)), Duration::from_millis(4_250));
    /// assert_eq!(policy.backoff_delay(8, Duration::ZERO), Duration::from_secs(30));
    /// ```
    pub fn backoff_delay(&self, attempt: u32, jitter: Duration) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .saturating_mul(factor)
            .saturating_add(jitter)
            .min(self.max_delay)
    }

    fn sample_jitter(&self) -> Duration {
        let ceiling = u64::try_from(self.jitter_ceiling.as_nanos()).unwrap_or(u64::MAX);
        if ceiling == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(rand::thread_rng().gen_range(0..ceiling))
    }

    fn next_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.backoff_delay(attempt, self.sample_jitter());
        match retry_after {
            Some(cooldown) => backoff.max(cooldown).min(self.max_delay),
            None => backoff,
        }
    }

    /// Trace record for a finished attempt, with the sleep that follows it.
    ///
    /// Ready and fatal attempts, and the last allowed attempt, have no delay.
    fn attempt_record(
        &self,
        attempt: u32,
        outcome: AttemptOutcome,
        retry_after: Option<Duration>,
    ) -> RetryAttempt {
        let delay = match outcome {
            AttemptOutcome::Ready | AttemptOutcome::Fatal => None,
            _ if attempt >= self.max_attempts => None,
            _ => Some(self.next_delay(attempt, retry_after)),
        };
        RetryAttempt {
            attempt,
            delay,
            outcome,
        }
    }

    /// Poll `probe` until it is ready, attempts run out, or it fails fatally.
    ///
    /// # Errors
    ///
    /// - `RetryErrorKind::Exhausted` once `max_attempts` invocations produced
    ///   no usable value, carrying the last classification
    /// - the probe's own error when it is not retryable
    pub async fn retry<T, F, Fut>(&self, probe: F) -> RiftgateResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RiftgateResult<ProbeOutcome<T>>>,
    {
        self.retry_with_cancel(&CancelSignal::never(), probe).await
    }

    /// Like [`retry`](Self::retry), checking `cancel` before every attempt
    /// and while sleeping between attempts.
    ///
    /// # Errors
    ///
    /// Additionally returns `RetryErrorKind::Cancelled` once `cancel` fires.
    #[instrument(skip(self, cancel, probe), fields(max_attempts = self.max_attempts))]
    pub async fn retry_with_cancel<T, F, Fut>(
        &self,
        cancel: &CancelSignal,
        mut probe: F,
    ) -> RiftgateResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RiftgateResult<ProbeOutcome<T>>>,
    {
        let mut last = LastOutcome::NotReady;

        for attempt in 1..=self.max_attempts {
            if cancel.is_cancelled() {
                debug!(attempt, "Polling cancelled before attempt");
                return Err(RetryError::new(RetryErrorKind::Cancelled {
                    attempts: attempt - 1,
                })
                .into());
            }

            let (outcome, retry_after) = match probe().await {
                Ok(ProbeOutcome::Ready(value)) => {
                    trace_attempt(&self.attempt_record(attempt, AttemptOutcome::Ready, None));
                    return Ok(value);
                }
                Ok(ProbeOutcome::NotReady) => (AttemptOutcome::NotReady, None),
                Err(e) => {
                    let transient = e
                        .is_retryable()
                        .then(|| e.upstream_kind().cloned())
                        .flatten();
                    let Some(kind) = transient else {
                        warn!(attempt, error = %e, "Permanent probe failure, failing immediately");
                        trace_attempt(&self.attempt_record(attempt, AttemptOutcome::Fatal, None));
                        return Err(e);
                    };
                    warn!(attempt, error = %e, "Transient probe failure, will back off");
                    (AttemptOutcome::Retryable(kind), e.retry_after())
                }
            };

            last = match &outcome {
                AttemptOutcome::Retryable(kind) => LastOutcome::Failed(kind.clone()),
                _ => LastOutcome::NotReady,
            };

            let record = self.attempt_record(attempt, outcome, retry_after);
            trace_attempt(&record);
            let Some(delay) = record.delay else {
                break;
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => {
                    debug!(attempt, "Polling cancelled during backoff");
                    return Err(RetryError::new(RetryErrorKind::Cancelled { attempts: attempt }).into());
                }
            }
        }

        Err(RetryError::new(RetryErrorKind::Exhausted {
            attempts: self.max_attempts,
            last,
        })
        .into())
    }
}

fn trace_attempt(record: &RetryAttempt) {
    debug!(
        attempt = record.attempt,
        delay = ?record.delay,
        outcome = ?record.outcome,
        "Probe attempt finished"
    );
}
