//! Top-level error wrapper types.

use crate::{
    ConfigError, GatewayError, GatewayErrorKind, JsonError, LastOutcome, RetryError,
    RetryErrorKind, RetryableError, UpstreamError, UpstreamErrorKind,
};
use std::time::Duration;

/// Every failure a Riftgate operation can report.
///
/// # Examples
///
/// ```
/// use riftgate_error::{RiftgateError, UpstreamError, UpstreamErrorKind};
///
/// let err: RiftgateError = UpstreamError::new(UpstreamErrorKind::Forbidden).into();
/// assert!(format!("{}", err).contains("Forbidden"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum RiftgateErrorKind {
    /// Classified upstream failure
    #[from(UpstreamError)]
    Upstream(UpstreamError),
    /// Gateway failure (cancelled or closed)
    #[from(GatewayError)]
    Gateway(GatewayError),
    /// Retry helper gave up
    #[from(RetryError)]
    Retry(RetryError),
    /// Payload decoding error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Riftgate error with kind discrimination.
///
/// # Examples
///
/// ```
/// use riftgate_error::{ConfigError, RiftgateResult};
///
/// fn might_fail() -> RiftgateResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Riftgate Error: {}", _0)]
pub struct RiftgateError(Box<RiftgateErrorKind>);

impl RiftgateError {
    /// Create a new error from a kind.
    pub fn new(kind: RiftgateErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RiftgateErrorKind {
        &self.0
    }

    /// The upstream classification behind this error, if there is one.
    ///
    /// Retry exhaustion caused by a failing probe reports that failure's
    /// classification.
    pub fn upstream_kind(&self) -> Option<&UpstreamErrorKind> {
        match self.kind() {
            RiftgateErrorKind::Upstream(e) => Some(e.kind()),
            RiftgateErrorKind::Retry(e) => match e.kind() {
                RetryErrorKind::Exhausted {
                    last: LastOutcome::Failed(kind),
                    ..
                } => Some(kind),
                _ => None,
            },
            _ => None,
        }
    }

    /// Text shown to the end user for this error.
    pub fn user_message(&self) -> &'static str {
        if let Some(kind) = self.upstream_kind() {
            return kind.user_message();
        }
        match self.kind() {
            RiftgateErrorKind::Retry(e) => match e.kind() {
                RetryErrorKind::Exhausted { .. } => "No data was found. Please try again later.",
                RetryErrorKind::Cancelled { .. } => "The request was cancelled.",
            },
            RiftgateErrorKind::Gateway(e) if e.kind() == &GatewayErrorKind::Cancelled => {
                "The request was cancelled."
            }
            _ => "An unexpected error occurred.",
        }
    }
}

/// Only a direct upstream failure is retryable; an exhausted or cancelled
/// retry is final even when it wraps a transient failure.
impl RetryableError for RiftgateError {
    fn is_retryable(&self) -> bool {
        matches!(self.kind(), RiftgateErrorKind::Upstream(e) if e.is_retryable())
    }

    fn retry_after(&self) -> Option<Duration> {
        match self.kind() {
            RiftgateErrorKind::Upstream(e) => e.retry_after(),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to RiftgateErrorKind
impl<T> From<T> for RiftgateError
where
    T: Into<RiftgateErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Riftgate operations.
pub type RiftgateResult<T> = std::result::Result<T, RiftgateError>;
