//! Retry helper error types.

use crate::UpstreamErrorKind;

/// What the final probe attempt produced before the helper gave up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum LastOutcome {
    /// The probe answered, but the precondition was not met yet
    #[display("not ready")]
    NotReady,
    /// The probe failed with a retryable upstream error
    #[display("{}", _0)]
    Failed(UpstreamErrorKind),
}

/// Terminal conditions of a bounded retry loop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RetryErrorKind {
    /// Every attempt was used without a usable result
    #[display("Exhausted retries after {} attempts (last outcome: {})", attempts, last)]
    Exhausted {
        /// Number of probe invocations made
        attempts: u32,
        /// Classification of the final attempt
        last: LastOutcome,
    },
    /// The cancellation signal fired between attempts
    #[display("Polling cancelled after {} attempts", attempts)]
    Cancelled {
        /// Number of probe invocations made before cancellation
        attempts: u32,
    },
}

/// Retry error with location tracking.
///
/// # Examples
///
/// ```
/// use riftgate_error::{LastOutcome, RetryError, RetryErrorKind};
///
/// let err = RetryError::new(RetryErrorKind::Exhausted {
///     attempts: 5,
///     last: LastOutcome::NotReady,
/// });
/// assert!(format!("{}", err).contains("5 attempts"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Retry Error: {} at line {} in {}", kind, line, file)]
pub struct RetryError {
    kind: RetryErrorKind,
    line: u32,
    file: &'static str,
}

impl RetryError {
    /// Create a new retry error with caller location tracking.
    #[track_caller]
    pub fn new(kind: RetryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RetryErrorKind {
        &self.kind
    }
}
