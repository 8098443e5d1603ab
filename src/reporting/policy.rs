//! Mobile usage threshold decision.
//!
//! Sites switch to a compact (hamburger) navigation once mobile visitors make
//! up a large enough share of traffic. The decision can be made on any
//! snapshot, or on the last `lookback_days` days of per-day metrics.

use crate::counters::{CounterSnapshot, DeviceCounters};
use crate::types::DeviceType;
use log::info;

/// Default mobile share, in percent, that turns on compact navigation.
pub const DEFAULT_MOBILE_THRESHOLD: f64 = 30.0;

/// Default number of days the history-based decision looks at.
pub const DEFAULT_LOOKBACK_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MobileUsagePolicy {
    threshold_percent: f64,
    lookback_days: u64,
}

impl Default for MobileUsagePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MOBILE_THRESHOLD)
    }
}

impl MobileUsagePolicy {
    pub fn new(threshold_percent: f64) -> Self {
        Self {
            threshold_percent,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }

    pub fn with_lookback_days(mut self, days: u64) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn threshold_percent(&self) -> f64 {
        self.threshold_percent
    }

    pub fn lookback_days(&self) -> u64 {
        self.lookback_days
    }

    /// Mobile share of `snapshot` in percent.
    pub fn mobile_percentage(&self, snapshot: &CounterSnapshot) -> f64 {
        snapshot.percentage(DeviceType::Mobile)
    }

    /// Whether the mobile share meets the threshold.
    ///
    /// An empty snapshot has a 0% mobile share, so it only qualifies when the
    /// threshold itself is 0.
    pub fn should_enable_compact_navigation(&self, snapshot: &CounterSnapshot) -> bool {
        let mobile = self.mobile_percentage(snapshot);
        let enable = mobile >= self.threshold_percent;

        info!(
            "Compact navigation decision: mobile usage {:.1}% vs threshold {}% = {}",
            mobile,
            self.threshold_percent,
            if enable { "ENABLED" } else { "DISABLED" }
        );

        enable
    }

    /// Decide from the last `lookback_days` days of per-day metrics.
    pub fn should_enable_compact_navigation_over_days(&self, counters: &DeviceCounters) -> bool {
        let recent = counters.daily_summary(self.lookback_days);
        info!(
            "Evaluating mobile usage over the last {} day(s): {} requests",
            self.lookback_days,
            recent.total()
        );
        self.should_enable_compact_navigation(&recent)
    }
}
