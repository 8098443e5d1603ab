//! Per-day access metrics.
//!
//! Each UTC day keeps one [`AccessMetrics`] record per device type with the
//! request count and the first and last access times. Days older than the
//! retention are dropped on write.

use super::snapshot::CounterSnapshot;
use crate::types::DeviceType;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// Days of per-day metrics kept when none is configured.
pub const DEFAULT_DAILY_RETENTION_DAYS: u64 = 90;

/// Days since the Unix epoch (UTC) for a Unix timestamp in milliseconds.
pub fn day_of(timestamp_ms: u64) -> u64 {
    timestamp_ms / MS_PER_DAY
}

/// Requests from one device type on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessMetrics {
    /// Days since the Unix epoch (UTC)
    pub day: u64,
    pub device_type: DeviceType,
    pub count: u64,
    pub first_access_ms: u64,
    pub last_access_ms: u64,
}

impl AccessMetrics {
    fn new(day: u64, device_type: DeviceType, now_ms: u64) -> Self {
        Self {
            day,
            device_type,
            count: 1,
            first_access_ms: now_ms,
            last_access_ms: now_ms,
        }
    }

    fn record(&mut self, now_ms: u64) {
        self.count += 1;
        self.first_access_ms = self.first_access_ms.min(now_ms);
        self.last_access_ms = self.last_access_ms.max(now_ms);
    }
}

/// Day-ordered access metrics with bounded retention.
#[derive(Debug)]
pub(crate) struct DailyBuckets {
    /// Sorted by `(day, device_type)`
    metrics: VecDeque<AccessMetrics>,
    retention_days: u64,
}

impl DailyBuckets {
    pub(crate) fn new(retention_days: u64) -> Self {
        Self {
            metrics: VecDeque::new(),
            retention_days: retention_days.max(1),
        }
    }

    pub(crate) fn retention_days(&self) -> u64 {
        self.retention_days
    }

    pub(crate) fn record(&mut self, device_type: DeviceType, now_ms: u64) {
        let day = day_of(now_ms);
        let key = (day, device_type.index());

        // Today's records sit at the back, so scan from there
        match self
            .metrics
            .iter()
            .rposition(|m| (m.day, m.device_type.index()) <= key)
        {
            Some(pos) if (self.metrics[pos].day, self.metrics[pos].device_type.index()) == key => {
                self.metrics[pos].record(now_ms);
            }
            Some(pos) => self.metrics.insert(pos + 1, AccessMetrics::new(day, device_type, now_ms)),
            None => self.metrics.push_front(AccessMetrics::new(day, device_type, now_ms)),
        }

        let Some(latest) = self.metrics.back().map(|m| m.day) else {
            return;
        };
        while self
            .metrics
            .front()
            .is_some_and(|m| m.day + self.retention_days <= latest)
        {
            self.metrics.pop_front();
        }
    }

    pub(crate) fn all(&self) -> Vec<AccessMetrics> {
        self.metrics.iter().copied().collect()
    }

    /// Counts for `today` and the `days - 1` days before it.
    ///
    /// The snapshot's `window_minutes` is the span in minutes. `Unknown`
    /// requests are left out, like every other snapshot.
    pub(crate) fn summary(&self, days: u64, today: u64, now_ms: u64) -> CounterSnapshot {
        let window_minutes = i64::try_from(days.saturating_mul(24 * 60)).unwrap_or(i64::MAX);
        let (mut mobile, mut tablet, mut desktop) = (0, 0, 0);
        let mut first: Option<u64> = None;
        let mut last: Option<u64> = None;

        for m in self
            .metrics
            .iter()
            .filter(|m| m.day <= today && m.day.saturating_add(days) > today)
        {
            match m.device_type {
                DeviceType::Mobile => mobile += m.count,
                DeviceType::Tablet => tablet += m.count,
                DeviceType::Desktop => desktop += m.count,
                DeviceType::Unknown => continue,
            }
            first = Some(first.map_or(m.first_access_ms, |f| f.min(m.first_access_ms)));
            last = Some(last.map_or(m.last_access_ms, |l| l.max(m.last_access_ms)));
        }

        CounterSnapshot::new(window_minutes, mobile, tablet, desktop, now_ms).with_request_span(first, last)
    }

    pub(crate) fn clear(&mut self) {
        self.metrics.clear();
    }
}
