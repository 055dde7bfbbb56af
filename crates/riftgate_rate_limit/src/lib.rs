//! Pacing, polling and configuration for the Riftgate gateway.
//!
//! This crate provides the pieces the gateway and its callers share:
//! - [`DualWindowLimiter`]: short-window, long-window and minimum-spacing
//!   admission control for one upstream credential
//! - [`RetryPolicy`]: bounded exponential backoff with jitter for probes that
//!   poll until a precondition holds
//! - [`CancelSignal`]: cooperative cancellation for both
//! - [`RiftgateConfig`]: TOML configuration with bundled defaults
//!
//! The limiter carries no synchronization of its own. Exactly one owner (the
//! gateway's drain loop) mutates it.

mod cancel;
mod config;
mod limiter;
mod retry;

pub use cancel::{CancelHandle, CancelSignal};
pub use config::{LimiterConfig, RetryConfig, RiftgateConfig, RoutingConfig};
pub use limiter::DualWindowLimiter;
pub use retry::{AttemptOutcome, ProbeOutcome, RetryAttempt, RetryPolicy, absent_on_not_found};
