//! Classification of upstream (game-data service) failures.

use std::time::Duration;

/// Classified outcome of a failed upstream call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum UpstreamErrorKind {
    /// Expired or invalid credential
    #[display("Unauthorized: API credential is invalid or expired")]
    Unauthorized,
    /// Credential lacks permission for the resource
    #[display("Forbidden: API credential lacks permission")]
    Forbidden,
    /// Resource does not exist right now
    #[display("Not found")]
    NotFound,
    /// Provider rejected the call for rate limiting despite local pacing
    #[display("Rate limited by upstream (retry after {:?})", retry_after)]
    RateLimited {
        /// Cooldown requested through the `Retry-After` header
        retry_after: Option<Duration>,
    },
    /// 5xx answer from the provider
    #[display("Upstream server error: HTTP {}", status)]
    UpstreamServerError {
        /// HTTP status code
        status: u16,
    },
    /// Anything else, including failures that never produced a status
    #[display("Unknown upstream failure (status {:?}): {}", status, message)]
    Unknown {
        /// HTTP status code, if the provider answered at all
        status: Option<u16>,
        /// Diagnostic message
        message: String,
    },
}

impl UpstreamErrorKind {
    /// Classify an HTTP status code.
    ///
    /// # Examples
    ///
    /// ```
    /// use riftgate_error::UpstreamErrorKind;
    ///
    /// assert_eq!(UpstreamErrorKind::from_status(404, ""), UpstreamErrorKind::NotFound);
    /// assert_eq!(
    ///     UpstreamErrorKind::from_status(503, "Service Unavailable"),
    ///     UpstreamErrorKind::UpstreamServerError { status: 503 }
    /// );
    /// ```
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::RateLimited { retry_after: None },
            500..=599 => Self::UpstreamServerError { status },
            _ => Self::Unknown {
                status: Some(status),
                message: message.into(),
            },
        }
    }

    /// Whether a bounded backoff may retry this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::UpstreamServerError { .. }
        )
    }

    /// Whether this is a "does not exist right now" answer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Text shown to the end user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unauthorized => {
                "The game-data API key is invalid or has expired. Renew the key and try again."
            }
            Self::Forbidden => {
                "The game-data API key is not permitted to access this resource."
            }
            Self::NotFound => "No data was found.",
            Self::RateLimited { .. } | Self::UpstreamServerError { .. } => {
                "The game-data service is busy. Please try again later."
            }
            Self::Unknown { .. } => "An unexpected error occurred while contacting the game-data service.",
        }
    }
}

/// Upstream failure with source location tracking.
///
/// # Examples
///
/// ```
/// use riftgate_error::{UpstreamError, UpstreamErrorKind};
///
/// let err = UpstreamError::new(UpstreamErrorKind::Unauthorized);
/// assert!(format!("{}", err).contains("Unauthorized"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Upstream Error: {} at line {} in {}", kind, line, file)]
pub struct UpstreamError {
    /// The classified failure
    pub kind: UpstreamErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl UpstreamError {
    /// Create a new UpstreamError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: UpstreamErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Classify an HTTP status at the current location.
    #[track_caller]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self::new(UpstreamErrorKind::from_status(status, message))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &UpstreamErrorKind {
        &self.kind
    }
}

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use riftgate_error::{RetryableError, UpstreamError, UpstreamErrorKind};
///
/// let err = UpstreamError::new(UpstreamErrorKind::UpstreamServerError { status: 503 });
/// assert!(err.is_retryable());
///
/// let err = UpstreamError::new(UpstreamErrorKind::Unauthorized);
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503 or 429 return true. Permanent errors like
    /// 401 or 403 return false.
    fn is_retryable(&self) -> bool;

    /// Minimum cooldown the failing side asked for, if any.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl RetryableError for UpstreamError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_after(&self) -> Option<Duration> {
        match self.kind {
            UpstreamErrorKind::RateLimited { retry_after } => retry_after,
            _ => None,
        }
    }
}
