//! Dual-window admission limiter.
//!
//! The limiter enforces three independent constraints at once:
//! - at most `short_window_budget` admissions per short window
//! - at most `long_window_budget` admissions per long window
//! - at least `min_spacing` between two admissions
//!
//! Windows use a rolling reset: a window's counter drops back to zero only
//! when the window is observed to be stale while recording an admission.
//! There is no background timer. A burst that straddles a reset can briefly
//! exceed the nominal budget when measured over an arbitrary trailing
//! interval; this is an accepted approximation, not a precise sliding window.
//!
//! The limiter is a plain value with no interior synchronization. The
//! gateway's drain loop owns it exclusively.

use crate::LimiterConfig;
use std::time::Duration;
use tokio::time::Instant;

/// One fixed-budget window with rolling reset.
#[derive(Debug, Clone, Copy)]
struct Window {
    budget: u32,
    length: Duration,
    count: u32,
    started: Option<Instant>,
}

impl Window {
    fn new(budget: u32, length: Duration) -> Self {
        Self {
            budget,
            length,
            count: 0,
            started: None,
        }
    }

    fn is_stale(&self, now: Instant) -> bool {
        match self.started {
            Some(started) => now.saturating_duration_since(started) >= self.length,
            None => true,
        }
    }

    fn delay(&self, now: Instant) -> Duration {
        match self.started {
            Some(started) if !self.is_stale(now) && self.count >= self.budget => {
                (started + self.length).saturating_duration_since(now)
            }
            _ => Duration::ZERO,
        }
    }

    fn record(&mut self, now: Instant) {
        if self.is_stale(now) {
            self.count = 0;
            self.started = Some(now);
        }
        self.count += 1;
    }

    fn admitted(&self, now: Instant) -> u32 {
        if self.is_stale(now) { 0 } else { self.count }
    }
}

/// Limiter state for one gateway.
///
/// # Example
///
/// ```
/// use riftgate_rate_limit::{DualWindowLimiter, LimiterConfig};
/// use tokio::time::Instant;
///
/// let mut limiter = DualWindowLimiter::new(&LimiterConfig::default());
/// let now = Instant::now();
/// assert!(limiter.next_admission_delay(now).is_zero());
///
/// limiter.record_admission(now);
/// // A second admission must respect the minimum spacing.
/// assert!(!limiter.next_admission_delay(now).is_zero());
/// ```
#[derive(Debug, Clone)]
pub struct DualWindowLimiter {
    short: Window,
    long: Window,
    min_spacing: Duration,
    last_admission: Option<Instant>,
}

impl DualWindowLimiter {
    /// Create a limiter with empty windows.
    pub fn new(config: &LimiterConfig) -> Self {
        Self {
            short: Window::new(config.short_window_budget, config.short_window()),
            long: Window::new(config.long_window_budget, config.long_window()),
            min_spacing: config.min_spacing(),
            last_admission: None,
        }
    }

    /// How long to wait before admitting at `now`.
    ///
    /// Returns zero when neither window budget nor the minimum spacing would
    /// be violated. Otherwise returns the smallest wait after which all three
    /// constraints are satisfied. This is a pure query.
    pub fn next_admission_delay(&self, now: Instant) -> Duration {
        let spacing = self
            .last_admission
            .map(|last| (last + self.min_spacing).saturating_duration_since(now))
            .unwrap_or(Duration::ZERO);

        self.short
            .delay(now)
            .max(self.long.delay(now))
            .max(spacing)
    }

    /// Record that a request is being sent at `now`.
    ///
    /// Call exactly once per request, immediately before sending it.
    pub fn record_admission(&mut self, now: Instant) {
        self.short.record(now);
        self.long.record(now);
        self.last_admission = Some(now);
    }

    /// Admissions counted in the current short window.
    pub fn short_window_admissions(&self, now: Instant) -> u32 {
        self.short.admitted(now)
    }

    /// Admissions counted in the current long window.
    pub fn long_window_admissions(&self, now: Instant) -> u32 {
        self.long.admitted(now)
    }

    /// When the last request was admitted.
    pub fn last_admission(&self) -> Option<Instant> {
        self.last_admission
    }
}
