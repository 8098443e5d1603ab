//! # Analytics Configuration
//!
//! Typed settings for tracking and reporting. Values come from, in order:
//! built-in defaults, an optional JSON file, then `DEVICE_ANALYTICS_*`
//! environment variables.

use crate::counters::DEFAULT_DAILY_RETENTION_DAYS;
use crate::error::{AnalyticsError, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_ENABLED: &str = "DEVICE_ANALYTICS_ENABLED";
pub const ENV_WINDOW_MINUTES: &str = "DEVICE_ANALYTICS_WINDOW_MINUTES";
pub const ENV_REPORT_INTERVAL_SECS: &str = "DEVICE_ANALYTICS_REPORT_INTERVAL_SECS";
pub const ENV_MOBILE_THRESHOLD: &str = "DEVICE_ANALYTICS_MOBILE_THRESHOLD";
pub const ENV_LOOKBACK_DAYS: &str = "DEVICE_ANALYTICS_LOOKBACK_DAYS";

/// Longest accepted rolling window (7 days).
pub const MAX_ROLLING_WINDOW_MINUTES: u64 = 7 * 24 * 60;

/// Configuration for device analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Enable request tracking
    pub enabled: bool,

    /// Rolling window length in minutes
    pub rolling_window_minutes: u64,

    /// Seconds between periodic usage log lines
    pub report_interval_secs: u64,

    /// Enable the periodic usage reporter
    pub report_enabled: bool,

    /// Mobile share (percent) at or above which compact navigation is advised
    pub mobile_usage_threshold: f64,

    /// Days of per-day history the compact navigation decision looks at
    pub mobile_usage_lookback_days: u64,

    /// Count requests for static assets (css, js, images) as well
    pub track_static_assets: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            enabled: true,
            rolling_window_minutes: 60,
            report_interval_secs: 5 * 60,
            report_enabled: true,
            mobile_usage_threshold: 30.0,
            mobile_usage_lookback_days: 7,
            track_static_assets: false,
        }
    }
}

impl AnalyticsConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| AnalyticsError::io(path, e))?;
        let config: AnalyticsConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `DEVICE_ANALYTICS_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_ENABLED) {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.enabled = true,
                "0" | "false" | "no" | "off" => self.enabled = false,
                other => warn!("Ignoring {}={}: expected a boolean", ENV_ENABLED, other),
            }
        }

        if let Some(value) = lookup(ENV_WINDOW_MINUTES) {
            match value.trim().parse() {
                Ok(minutes) => self.rolling_window_minutes = minutes,
                Err(e) => warn!("Ignoring {}={}: {}", ENV_WINDOW_MINUTES, value, e),
            }
        }

        if let Some(value) = lookup(ENV_REPORT_INTERVAL_SECS) {
            match value.trim().parse() {
                Ok(secs) => self.report_interval_secs = secs,
                Err(e) => warn!("Ignoring {}={}: {}", ENV_REPORT_INTERVAL_SECS, value, e),
            }
        }

        if let Some(value) = lookup(ENV_MOBILE_THRESHOLD) {
            match value.trim().parse() {
                Ok(threshold) => self.mobile_usage_threshold = threshold,
                Err(e) => warn!("Ignoring {}={}: {}", ENV_MOBILE_THRESHOLD, value, e),
            }
        }

        if let Some(value) = lookup(ENV_LOOKBACK_DAYS) {
            match value.trim().parse() {
                Ok(days) => self.mobile_usage_lookback_days = days,
                Err(e) => warn!("Ignoring {}={}: {}", ENV_LOOKBACK_DAYS, value, e),
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject settings the counters and reporter cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.rolling_window_minutes == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "rolling_window_minutes must be greater than zero".to_string(),
            ));
        }
        if self.rolling_window_minutes > MAX_ROLLING_WINDOW_MINUTES {
            return Err(AnalyticsError::InvalidConfig(format!(
                "rolling_window_minutes must be at most {}, got {}",
                MAX_ROLLING_WINDOW_MINUTES, self.rolling_window_minutes
            )));
        }
        if self.report_interval_secs == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "report_interval_secs must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.mobile_usage_threshold) {
            return Err(AnalyticsError::InvalidConfig(format!(
                "mobile_usage_threshold must be within 0..=100, got {}",
                self.mobile_usage_threshold
            )));
        }
        if !(1..=DEFAULT_DAILY_RETENTION_DAYS).contains(&self.mobile_usage_lookback_days) {
            return Err(AnalyticsError::InvalidConfig(format!(
                "mobile_usage_lookback_days must be within 1..={}, got {}",
                DEFAULT_DAILY_RETENTION_DAYS, self.mobile_usage_lookback_days
            )));
        }
        Ok(())
    }

    pub fn rolling_window(&self) -> Duration {
        Duration::from_secs(self.rolling_window_minutes.saturating_mul(60))
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }
}
