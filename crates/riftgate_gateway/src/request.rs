//! Queued units of work.

use futures::FutureExt;
use futures::future::BoxFuture;
use riftgate_error::{RiftgateResult, UpstreamError, UpstreamErrorKind};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Type-erased operation paired with its completion handle.
trait Job: Send {
    /// The submitter stopped waiting for the result.
    fn is_abandoned(&self) -> bool;

    /// Run the operation once and resolve the completion handle.
    fn run(self: Box<Self>, id: u64) -> BoxFuture<'static, ()>;
}

struct Task<F, T> {
    operation: F,
    reply: oneshot::Sender<RiftgateResult<T>>,
}

impl<F, Fut, T> Job for Task<F, T>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = RiftgateResult<T>> + Send + 'static,
    T: Send + 'static,
{
    fn is_abandoned(&self) -> bool {
        self.reply.is_closed()
    }

    fn run(self: Box<Self>, id: u64) -> BoxFuture<'static, ()> {
        let Task { operation, reply } = *self;
        async move {
            let outcome = match AssertUnwindSafe(async move { operation().await })
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(UpstreamError::new(UpstreamErrorKind::Unknown {
                    status: None,
                    message: "upstream operation panicked".to_string(),
                })
                .into()),
            };

            if let Err(e) = &outcome {
                warn!(request_id = id, error = %e, "Upstream request failed");
            }

            if reply.send(outcome).is_err() {
                debug!(request_id = id, "Submitter gone, discarding result");
            }
        }
        .boxed()
    }
}

/// One submitted upstream call waiting in the gateway queue.
///
/// Owned by the queue until the drain loop consumes it. Its completion
/// handle is resolved exactly once.
pub(crate) struct PendingRequest {
    id: u64,
    job: Box<dyn Job>,
}

impl PendingRequest {
    /// Wrap `operation` and return the receiving end of its completion handle.
    pub(crate) fn new<F, Fut, T>(
        id: u64,
        operation: F,
    ) -> (Self, oneshot::Receiver<RiftgateResult<T>>)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RiftgateResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (reply, rx) = oneshot::channel();
        let request = Self {
            id,
            job: Box::new(Task { operation, reply }),
        };
        (request, rx)
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Whether the submitter cancelled before admission.
    pub(crate) fn is_abandoned(&self) -> bool {
        self.job.is_abandoned()
    }

    /// Execute the operation and deliver its outcome.
    ///
    /// Never fails: errors and panics are forwarded to the submitter.
    pub(crate) async fn execute(self) {
        self.job.run(self.id).await
    }
}

impl std::fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .field("abandoned", &self.is_abandoned())
            .finish()
    }
}
