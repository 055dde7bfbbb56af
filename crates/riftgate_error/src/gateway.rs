//! Request gateway error types.

/// Gateway-side failure conditions, distinct from upstream failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GatewayErrorKind {
    /// The drain loop dropped the completion handle without a result
    #[display("Gateway closed the request without delivering a result")]
    Closed,
    /// The submitter cancelled the request before it completed
    #[display("Request cancelled by caller")]
    Cancelled,
}

/// Gateway error with location tracking.
///
/// # Examples
///
/// ```
/// use riftgate_error::{GatewayError, GatewayErrorKind};
///
/// let err = GatewayError::new(GatewayErrorKind::Cancelled);
/// assert_eq!(err.kind(), &GatewayErrorKind::Cancelled);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gateway Error: {} at line {} in {}", kind, line, file)]
pub struct GatewayError {
    kind: GatewayErrorKind,
    line: u32,
    file: &'static str,
}

impl GatewayError {
    /// Create a new gateway error with caller location tracking.
    #[track_caller]
    pub fn new(kind: GatewayErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GatewayErrorKind {
        &self.kind
    }
}
