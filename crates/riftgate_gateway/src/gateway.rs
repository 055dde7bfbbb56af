//! The request gateway: FIFO queue plus a single-flight drain loop.

use crate::request::PendingRequest;
use parking_lot::Mutex;
use riftgate_error::{GatewayError, GatewayErrorKind, RiftgateResult};
use riftgate_rate_limit::{CancelSignal, DualWindowLimiter, LimiterConfig};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};

/// Queue shared by submitters and the drain loop.
///
/// `limiter` is `Some` while no drain loop runs. Starting a loop takes the
/// limiter out, stopping one puts it back, both under the queue lock, so at
/// most one loop exists and the limiter always has a single owner.
#[derive(Debug)]
struct Queue {
    pending: VecDeque<PendingRequest>,
    limiter: Option<DualWindowLimiter>,
}

#[derive(Debug)]
struct Inner {
    queue: Mutex<Queue>,
    next_id: AtomicU64,
    min_spacing: Duration,
}

/// Chokepoint for every call to one upstream credential.
///
/// Calls are admitted to the network one at a time, in submission order, no
/// faster than the [`DualWindowLimiter`] allows. A failing call only fails
/// its own submission.
///
/// Cloning is cheap and shares the queue; build one gateway per credential.
///
/// # Example
///
/// ```rust,ignore
/// use riftgate_gateway::Gateway;
/// use riftgate_rate_limit::LimiterConfig;
///
/// let gateway = Gateway::new(&LimiterConfig::default());
/// let summoner = gateway
///     .submit(move || async move { transport.get(&url, &headers).await.map_err(Into::into) })
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Gateway {
    inner: Arc<Inner>,
}

impl Gateway {
    /// Create an idle gateway with empty limiter windows.
    pub fn new(config: &LimiterConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(Queue {
                    pending: VecDeque::new(),
                    limiter: Some(DualWindowLimiter::new(config)),
                }),
                next_id: AtomicU64::new(0),
                min_spacing: config.min_spacing(),
            }),
        }
    }

    /// Queue `operation` and wait for its outcome.
    ///
    /// The request is appended to the queue when `submit` is called, not
    /// when the returned future is first polled, so calls made in sequence
    /// are admitted in that sequence. Dropping the returned future before
    /// admission removes the request without spending rate budget; dropping
    /// it after admission lets the call finish and discards the result.
    ///
    /// Must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, or `GatewayErrorKind::Closed` if
    /// the completion handle was dropped without a result.
    pub fn submit<F, Fut, T>(
        &self,
        operation: F,
    ) -> impl Future<Output = RiftgateResult<T>> + Send + 'static
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RiftgateResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let rx = self.enqueue(operation);
        async move {
            match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(GatewayError::new(GatewayErrorKind::Closed).into()),
            }
        }
    }

    /// Like [`submit`](Self::submit), giving up once `cancel` fires.
    ///
    /// # Errors
    ///
    /// Additionally returns `GatewayErrorKind::Cancelled`.
    pub fn submit_with_cancel<F, Fut, T>(
        &self,
        cancel: &CancelSignal,
        operation: F,
    ) -> impl Future<Output = RiftgateResult<T>> + Send + 'static
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RiftgateResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let cancel = cancel.clone();
        let submission = self.submit(operation);
        async move {
            tokio::select! {
                biased;
                outcome = submission => outcome,
                _ = cancel.cancelled() => Err(GatewayError::new(GatewayErrorKind::Cancelled).into()),
            }
        }
    }

    /// Number of requests waiting for admission.
    pub fn queue_depth(&self) -> usize {
        self.inner.queue.lock().pending.len()
    }

    /// Whether a drain loop is currently running.
    pub fn is_draining(&self) -> bool {
        self.inner.queue.lock().limiter.is_none()
    }

    fn enqueue<F, Fut, T>(&self, operation: F) -> tokio::sync::oneshot::Receiver<RiftgateResult<T>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RiftgateResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (request, rx) = PendingRequest::new(id, operation);

        let idle_limiter = {
            let mut queue = self.inner.queue.lock();
            queue.pending.push_back(request);
            debug!(request_id = id, queue_depth = queue.pending.len(), "Request queued");
            queue.limiter.take()
        };

        if let Some(limiter) = idle_limiter {
            tokio::spawn(drain(LimiterSlot {
                inner: Arc::clone(&self.inner),
                limiter: Some(limiter),
            }));
        }

        rx
    }
}

/// Pop the oldest request the submitter still waits for.
fn pop_live(queue: &mut Queue) -> Option<PendingRequest> {
    while let Some(request) = queue.pending.pop_front() {
        if request.is_abandoned() {
            debug!(request_id = request.id(), "Skipping cancelled request");
            continue;
        }
        return Some(request);
    }
    None
}

/// Drop abandoned requests at the head; true if a live one remains.
fn has_live_head(queue: &mut Queue) -> bool {
    while let Some(front) = queue.pending.front() {
        if !front.is_abandoned() {
            return true;
        }
        if let Some(request) = queue.pending.pop_front() {
            debug!(request_id = request.id(), "Skipping cancelled request");
        }
    }
    false
}

/// The limiter while a drain loop holds it.
///
/// Dropping the slot parks the limiter back in the queue, so a drain task
/// that is aborted or torn down with its runtime leaves the gateway idle
/// instead of wedged. The next submission starts a fresh loop.
struct LimiterSlot {
    inner: Arc<Inner>,
    limiter: Option<DualWindowLimiter>,
}

impl Drop for LimiterSlot {
    fn drop(&mut self) {
        if let Some(limiter) = self.limiter.take() {
            let mut queue = self.inner.queue.lock();
            queue.limiter = Some(limiter);
            warn!(
                queue_depth = queue.pending.len(),
                "Drain loop ended early, limiter returned to queue"
            );
        }
    }
}

/// Saturating millisecond count for log fields.
fn delay_ms(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

/// The single worker of a gateway.
///
/// Runs until the queue is empty, then hands the limiter back to the queue.
#[instrument(skip_all)]
async fn drain(mut slot: LimiterSlot) {
    debug!("Drain loop started");

    loop {
        {
            let mut queue = slot.inner.queue.lock();
            if !has_live_head(&mut queue) {
                queue.limiter = slot.limiter.take();
                debug!("Queue empty, drain loop stopped");
                return;
            }
        }

        let Some(limiter) = slot.limiter.as_mut() else {
            return;
        };

        loop {
            let delay = limiter.next_admission_delay(Instant::now());
            if delay.is_zero() {
                break;
            }
            if delay > slot.inner.min_spacing {
                info!(delay_ms = delay_ms(delay), "Window budget spent, waiting");
            }
            sleep(delay).await;
        }

        let next = {
            let mut queue = slot.inner.queue.lock();
            pop_live(&mut queue)
        };
        let Some(request) = next else {
            continue;
        };

        limiter.record_admission(Instant::now());
        debug!(request_id = request.id(), "Request admitted");
        request.execute().await;
    }
}
