//! Immutable views over the counters store.

use crate::types::DeviceType;
use serde::{Deserialize, Serialize};

/// `window_minutes` value marking a cumulative (since start) snapshot.
pub const CUMULATIVE_WINDOW: i64 = -1;

/// Per-type request counts at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSnapshot {
    /// Window length in minutes, or [`CUMULATIVE_WINDOW`]
    pub window_minutes: i64,
    pub mobile: u64,
    pub tablet: u64,
    pub desktop: u64,
    /// When the snapshot was taken (Unix ms)
    pub timestamp_ms: u64,
    /// Earliest counted request (Unix ms), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_request_ms: Option<u64>,
    /// Latest counted request (Unix ms), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_request_ms: Option<u64>,
}

impl CounterSnapshot {
    pub fn new(window_minutes: i64, mobile: u64, tablet: u64, desktop: u64, timestamp_ms: u64) -> Self {
        Self {
            window_minutes,
            mobile,
            tablet,
            desktop,
            timestamp_ms,
            first_request_ms: None,
            last_request_ms: None,
        }
    }

    /// Attach the first and last request times covered by this snapshot.
    pub fn with_request_span(mut self, first_request_ms: Option<u64>, last_request_ms: Option<u64>) -> Self {
        self.first_request_ms = first_request_ms;
        self.last_request_ms = last_request_ms;
        self
    }

    /// Whether this snapshot covers everything since start.
    pub fn is_cumulative(&self) -> bool {
        self.window_minutes == CUMULATIVE_WINDOW
    }

    /// Sum of mobile, tablet and desktop.
    pub fn total(&self) -> u64 {
        self.mobile + self.tablet + self.desktop
    }

    /// Count for one device type. `Unknown` is not part of a snapshot.
    pub fn count(&self, device_type: DeviceType) -> u64 {
        match device_type {
            DeviceType::Mobile => self.mobile,
            DeviceType::Tablet => self.tablet,
            DeviceType::Desktop => self.desktop,
            DeviceType::Unknown => 0,
        }
    }

    /// Share of `device_type` in percent, 0 when the snapshot is empty.
    pub fn percentage(&self, device_type: DeviceType) -> f64 {
        percent(self.count(device_type), self.total())
    }

    /// Report figures for this snapshot. Snapshots never carry `Unknown`,
    /// so `unknown_requests` is 0.
    pub fn statistics(&self) -> DeviceStatistics {
        DeviceStatistics {
            total_requests: self.total(),
            mobile_requests: self.mobile,
            tablet_requests: self.tablet,
            desktop_requests: self.desktop,
            unknown_requests: 0,
            first_request_ms: self.first_request_ms,
            last_request_ms: self.last_request_ms,
        }
    }
}

/// Request totals with derived percentages, as shown on a report.
///
/// `total_requests` is mobile + tablet + desktop and is the denominator of
/// every percentage. `unknown_requests` is reported alongside but never
/// counted in the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatistics {
    pub total_requests: u64,
    pub mobile_requests: u64,
    pub tablet_requests: u64,
    pub desktop_requests: u64,
    pub unknown_requests: u64,
    pub first_request_ms: Option<u64>,
    pub last_request_ms: Option<u64>,
}

impl DeviceStatistics {
    pub fn mobile_percentage(&self) -> f64 {
        percent(self.mobile_requests, self.total_requests)
    }

    pub fn tablet_percentage(&self) -> f64 {
        percent(self.tablet_requests, self.total_requests)
    }

    pub fn desktop_percentage(&self) -> f64 {
        percent(self.desktop_requests, self.total_requests)
    }
}

fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}
