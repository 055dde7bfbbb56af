//! Error types for the Riftgate gateway.
//!
//! This crate provides the error taxonomy shared by every Riftgate crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Upstream failures are classified into [`UpstreamErrorKind`], which is what
//! handlers inspect to decide between "retry", "no data" and a fatal message.
//!
//! # Examples
//!
//! ```
//! use riftgate_error::{RiftgateResult, UpstreamError, UpstreamErrorKind};
//!
//! fn lookup() -> RiftgateResult<String> {
//!     Err(UpstreamError::new(UpstreamErrorKind::NotFound))?
//! }
//!
//! let err = lookup().unwrap_err();
//! assert_eq!(err.upstream_kind(), Some(&UpstreamErrorKind::NotFound));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod gateway;
mod json;
mod retry;
mod upstream;

pub use config::ConfigError;
pub use error::{RiftgateError, RiftgateErrorKind, RiftgateResult};
pub use gateway::{GatewayError, GatewayErrorKind};
pub use json::JsonError;
pub use retry::{LastOutcome, RetryError, RetryErrorKind};
pub use upstream::{RetryableError, UpstreamError, UpstreamErrorKind};
