//! Configuration module for the linkpulse monitor.
//!
//! Provides YAML-based configuration loading and validation for the monitor:
//! target address, failure threshold, polling interval, probe timeout and
//! link-down policy. Validation happens before the first tick; an
//! unmonitorable target is a fatal startup error, never a silent downgrade.

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::link::LinkDownPolicy;

// =============================================================================
// Constants
// =============================================================================

/// Default polling interval (10 seconds).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Default probe timeout (1 second).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Default failure threshold.
pub const DEFAULT_THRESHOLD: u32 = 3;

/// Minimum allowed polling interval (1 second).
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    Validation(String),
}

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_threshold() -> u32 {
    DEFAULT_THRESHOLD
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Monitor configuration.
    pub monitor: MonitorConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.monitor.validate()
    }
}

/// Configuration for the liveness monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Target address in literal numeric form. Hostnames are rejected.
    pub target: String,
    /// Consecutive failures required to trigger a pulse alert (default: 3).
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    /// Polling interval (default: 10s, minimum: 1s).
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,
    /// Per-probe timeout (default: 1s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    /// What a tick does while the host link is down (default: ignore).
    #[serde(default)]
    pub link_down_policy: LinkDownPolicy,
}

impl MonitorConfig {
    /// Create a configuration with defaults for the given target.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            threshold: DEFAULT_THRESHOLD,
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            link_down_policy: LinkDownPolicy::default(),
        }
    }

    /// Set the failure threshold.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the polling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the link-down policy.
    pub fn with_link_down_policy(mut self, policy: LinkDownPolicy) -> Self {
        self.link_down_policy = policy;
        self
    }

    /// Parse the target as a literal IP address.
    ///
    /// # Errors
    /// Returns a validation error for anything that is not a literal IP,
    /// including hostnames — name resolution is deliberately unsupported.
    pub fn target_addr(&self) -> Result<IpAddr, ConfigError> {
        self.target.parse::<IpAddr>().map_err(|_| {
            ConfigError::Validation(format!(
                "invalid target '{}': hostnames are not supported, use a literal IP (e.g. 8.8.8.8)",
                self.target
            ))
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target_addr()?;
        if self.threshold == 0 {
            return Err(ConfigError::Validation(
                "threshold must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Polling interval, clamped to [`MIN_INTERVAL`].
    pub fn effective_interval(&self) -> Duration {
        if self.interval < MIN_INTERVAL {
            tracing::warn!(min_interval = ?MIN_INTERVAL,
                "Interval is less than minimum allowed. Using minimum."
            );
            MIN_INTERVAL
        } else {
            self.interval
        }
    }
}
