//! Configuration structures for pacing and polling.
//!
//! This module provides TOML-based configuration. The configuration system
//! supports:
//! - Bundled defaults (include_str! from riftgate.toml)
//! - User overrides (./riftgate.toml or ~/.config/riftgate/riftgate.toml)
//! - Automatic merging with user values taking precedence
//!
//! Every section and field is optional; anything left out falls back to the
//! values of the provider's development-key limits.

use config::{Config, File, FileFormat};
use riftgate_error::{ConfigError, RiftgateResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Budgets of the dual-window limiter.
///
/// # Example
///
/// ```toml
/// [limiter]
/// short_window_budget = 19
/// short_window_ms = 1_000
/// long_window_budget = 95
/// long_window_ms = 120_000
/// min_spacing_ms = 60
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LimiterConfig {
    /// Admissions allowed per short window
    pub short_window_budget: u32,

    /// Length of the short window in milliseconds
    pub short_window_ms: u64,

    /// Admissions allowed per long window
    pub long_window_budget: u32,

    /// Length of the long window in milliseconds
    pub long_window_ms: u64,

    /// Minimum delay between two admissions in milliseconds
    pub min_spacing_ms: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            short_window_budget: 19,
            short_window_ms: 1_000,
            long_window_budget: 95,
            long_window_ms: 120_000,
            min_spacing_ms: 60,
        }
    }
}

impl LimiterConfig {
    /// Short window length.
    pub fn short_window(&self) -> Duration {
        Duration::from_millis(self.short_window_ms)
    }

    /// Long window length.
    pub fn long_window(&self) -> Duration {
        Duration::from_millis(self.long_window_ms)
    }

    /// Minimum spacing between admissions.
    pub fn min_spacing(&self) -> Duration {
        Duration::from_millis(self.min_spacing_ms)
    }

    /// Validates that every window can admit at least one request.
    ///
    /// # Errors
    ///
    /// Returns an error if a budget or a window length is zero.
    pub fn validate(&self) -> RiftgateResult<()> {
        if self.short_window_budget == 0 || self.long_window_budget == 0 {
            return Err(ConfigError::new("limiter window budgets must be non-zero").into());
        }
        if self.short_window_ms == 0 || self.long_window_ms == 0 {
            return Err(ConfigError::new("limiter window lengths must be non-zero").into());
        }
        Ok(())
    }
}

/// Parameters of the bounded polling backoff.
///
/// # Example
///
/// ```toml
/// [retry]
/// max_attempts = 10
/// base_delay_ms = 1_000
/// max_delay_ms = 30_000
/// jitter_ceiling_ms = 500
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Probe invocations before giving up
    pub max_attempts: u32,

    /// Delay after the first attempt, doubled on every further attempt
    pub base_delay_ms: u64,

    /// Upper bound of any single delay
    pub max_delay_ms: u64,

    /// Exclusive upper bound of the uniform jitter added to each delay
    pub jitter_ceiling_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            jitter_ceiling_ms: 500,
        }
    }
}

impl RetryConfig {
    /// Validates the retry parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_attempts` is zero or the base delay exceeds
    /// the delay cap.
    pub fn validate(&self) -> RiftgateResult<()> {
        if self.max_attempts == 0 {
            return Err(ConfigError::new("retry max_attempts must be at least 1").into());
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(ConfigError::new(format!(
                "retry base_delay_ms ({}) exceeds max_delay_ms ({})",
                self.base_delay_ms, self.max_delay_ms
            ))
            .into());
        }
        Ok(())
    }
}

/// Upstream routing hosts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Platform routing value, e.g. `jp1` or `euw1`
    pub platform: String,

    /// Regional routing value, e.g. `asia` or `europe`
    pub region: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            platform: "jp1".to_string(),
            region: "asia".to_string(),
        }
    }
}

/// Top-level Riftgate configuration.
///
/// Loads configuration from TOML files with a precedence system:
/// 1. Bundled defaults (include_str! from riftgate.toml)
/// 2. User override (~/.config/riftgate/riftgate.toml, then ./riftgate.toml)
///
/// # Example
///
/// ```no_run
/// use riftgate_rate_limit::RiftgateConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RiftgateConfig::load()?;
/// println!("Short window budget: {}", config.limiter.short_window_budget);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct RiftgateConfig {
    /// Dual-window limiter budgets
    #[serde(default)]
    pub limiter: LimiterConfig,

    /// Polling backoff parameters
    #[serde(default)]
    pub retry: RetryConfig,

    /// Upstream routing hosts
    #[serde(default)]
    pub routing: RoutingConfig,
}

impl RiftgateConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> RiftgateResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (riftgate.toml shipped with the library)
    /// 2. User config in home directory (~/.config/riftgate/riftgate.toml)
    /// 3. User config in current directory (./riftgate.toml)
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> RiftgateResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../riftgate.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/riftgate/riftgate.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("riftgate").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> RiftgateResult<()> {
        self.limiter.validate()?;
        self.retry.validate()
    }
}
