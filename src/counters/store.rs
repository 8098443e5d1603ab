//! # Device Counters Store
//!
//! Thread-safe cumulative and rolling-window request counting.
//!
//! Cumulative counts are one `AtomicU64` per device type. The rolling window
//! is a time-ordered log of `(timestamp, device type)` entries that is pruned
//! from the front on every write, so it only ever holds about one window's
//! worth of traffic. Per-day [`AccessMetrics`] back longer lookbacks such as
//! the mobile share over the last week.

use super::daily::{day_of, AccessMetrics, DailyBuckets, DEFAULT_DAILY_RETENTION_DAYS};
use super::snapshot::{CounterSnapshot, DeviceStatistics, CUMULATIVE_WINDOW};
use crate::types::{Clock, DeviceType, SystemClock};
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Length of the rolling window when none is configured.
pub const DEFAULT_ROLLING_WINDOW: Duration = Duration::from_secs(60 * 60);

/// One request recorded in the rolling log.
#[derive(Debug, Clone, Copy)]
struct RollingEntry {
    timestamp_ms: u64,
    device_type: DeviceType,
}

/// Everything guarded by the store mutex.
#[derive(Debug)]
struct CounterState {
    rolling_log: VecDeque<RollingEntry>,
    daily: DailyBuckets,
    /// First and last request of any type since start or reset
    first_request_ms: Option<u64>,
    last_request_ms: Option<u64>,
}

impl CounterState {
    fn new(daily_retention_days: u64) -> Self {
        Self {
            rolling_log: VecDeque::new(),
            daily: DailyBuckets::new(daily_retention_days),
            first_request_ms: None,
            last_request_ms: None,
        }
    }
}

/// Per-device-type request counters.
///
/// # Thread Safety
/// - `increment` and every summary take the same mutex, so a snapshot never
///   observes half of an increment
/// - cumulative counters are atomics and can also be read lock-free through
///   [`DeviceCounters::cumulative_count`]
///
/// # Unknown devices
/// Increments for [`DeviceType::Unknown`] are counted in
/// [`DeviceCounters::unknown_total`] and the per-day metrics. They do not
/// enter the rolling log or any snapshot's counts, but they do move the
/// first/last request times reported by [`DeviceCounters::statistics`].
#[derive(Debug)]
pub struct DeviceCounters {
    /// Cumulative counts indexed by `DeviceType::index()`
    cumulative: [AtomicU64; 4],

    /// Rolling log, per-day metrics and request span
    state: Mutex<CounterState>,

    /// Rolling window length
    window: Duration,

    /// Time source for log timestamps
    clock: Arc<dyn Clock>,
}

impl Default for DeviceCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceCounters {
    /// Create an empty store with a 60-minute window on the system clock.
    pub fn new() -> Self {
        Self::with_clock(DEFAULT_ROLLING_WINDOW, Arc::new(SystemClock))
    }

    /// Create an empty store with a custom window on the system clock.
    pub fn with_window(window: Duration) -> Self {
        Self::with_clock(window, Arc::new(SystemClock))
    }

    /// Create an empty store with a custom window and time source.
    ///
    /// # Example
    /// ```
    /// use device_analytics::{DeviceCounters, DeviceType, ManualClock};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// let clock = Arc::new(ManualClock::new(0));
    /// let counters = DeviceCounters::with_clock(Duration::from_secs(3600), clock.clone());
    ///
    /// counters.increment(DeviceType::Mobile);
    /// clock.advance(Duration::from_secs(3601));
    ///
    /// assert_eq!(counters.rolling_summary().mobile, 0);
    /// assert_eq!(counters.cumulative_summary().mobile, 1);
    /// ```
    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            cumulative: Default::default(),
            state: Mutex::new(CounterState::new(DEFAULT_DAILY_RETENTION_DAYS)),
            window,
            clock,
        }
    }

    /// Keep per-day metrics for `days` days (at least one) instead of the
    /// default 90.
    pub fn with_daily_retention(self, days: u64) -> Self {
        Self {
            state: Mutex::new(CounterState::new(days)),
            ..self
        }
    }

    pub fn daily_retention_days(&self) -> u64 {
        self.state.lock().daily.retention_days()
    }

    /// Rolling window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Rolling window length in whole minutes, as reported in snapshots.
    pub fn window_minutes(&self) -> i64 {
        (self.window.as_secs() / 60) as i64
    }

    // ============================================================================================
    // WRITES
    // ============================================================================================

    /// Record one request from `device_type` at the current time.
    ///
    /// Bumps the cumulative counter and today's per-day metrics, appends to
    /// the rolling log and drops log entries that have fallen out of the
    /// window.
    pub fn increment(&self, device_type: DeviceType) {
        let mut state = self.state.lock();
        let now = self.clock.now_ms();

        self.cumulative[device_type.index()].fetch_add(1, Ordering::Relaxed);
        state.daily.record(device_type, now);
        state.first_request_ms = Some(state.first_request_ms.map_or(now, |first| first.min(now)));
        state.last_request_ms = Some(state.last_request_ms.map_or(now, |last| last.max(now)));

        if device_type == DeviceType::Unknown {
            debug!("Counted unclassified request outside the rolling log");
            return;
        }

        state.rolling_log.push_back(RollingEntry {
            timestamp_ms: now,
            device_type,
        });

        let cutoff = self.cutoff(now);
        while state
            .rolling_log
            .front()
            .is_some_and(|entry| entry.timestamp_ms < cutoff)
        {
            state.rolling_log.pop_front();
        }
    }

    /// Zero every counter and empty the rolling log and per-day metrics.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.rolling_log.clear();
        state.daily.clear();
        state.first_request_ms = None;
        state.last_request_ms = None;
        for counter in &self.cumulative {
            counter.store(0, Ordering::Relaxed);
        }
        info!("Device counters reset");
    }

    // ============================================================================================
    // READS
    // ============================================================================================

    /// All-time counts since construction or the last reset.
    ///
    /// The returned snapshot has `window_minutes == -1`. Its request span
    /// covers every counted request, including `Unknown` ones.
    pub fn cumulative_summary(&self) -> CounterSnapshot {
        let state = self.state.lock();
        CounterSnapshot::new(
            CUMULATIVE_WINDOW,
            self.load(DeviceType::Mobile),
            self.load(DeviceType::Tablet),
            self.load(DeviceType::Desktop),
            self.clock.now_ms(),
        )
        .with_request_span(state.first_request_ms, state.last_request_ms)
    }

    /// Counts inside the trailing window at call time.
    pub fn rolling_summary(&self) -> CounterSnapshot {
        let state = self.state.lock();
        let now = self.clock.now_ms();
        let cutoff = self.cutoff(now);

        let (mut mobile, mut tablet, mut desktop) = (0, 0, 0);
        let mut first: Option<u64> = None;
        let mut last: Option<u64> = None;
        for entry in state
            .rolling_log
            .iter()
            .filter(|entry| entry.timestamp_ms >= cutoff)
        {
            match entry.device_type {
                DeviceType::Mobile => mobile += 1,
                DeviceType::Tablet => tablet += 1,
                DeviceType::Desktop => desktop += 1,
                DeviceType::Unknown => {}
            }
            first = Some(first.map_or(entry.timestamp_ms, |f| f.min(entry.timestamp_ms)));
            last = Some(last.map_or(entry.timestamp_ms, |l| l.max(entry.timestamp_ms)));
        }

        CounterSnapshot::new(self.window_minutes(), mobile, tablet, desktop, now).with_request_span(first, last)
    }

    /// Counts over today (UTC) and the `days - 1` days before it, from the
    /// per-day metrics.
    ///
    /// `window_minutes` is `days * 1440`. Days beyond the retention are
    /// gone, so asking for more than the retention counts only what is kept.
    pub fn daily_summary(&self, days: u64) -> CounterSnapshot {
        let state = self.state.lock();
        let now = self.clock.now_ms();
        state.daily.summary(days, day_of(now), now)
    }

    /// Mobile share in percent over the last `days` days, 0 with no traffic.
    pub fn mobile_share_over_days(&self, days: u64) -> f64 {
        self.daily_summary(days).percentage(DeviceType::Mobile)
    }

    /// Per-day, per-device metrics still retained, oldest day first.
    pub fn daily_usage(&self) -> Vec<AccessMetrics> {
        self.state.lock().daily.all()
    }

    /// Cumulative report figures, including `Unknown` requests and the
    /// first/last request times.
    pub fn statistics(&self) -> DeviceStatistics {
        let state = self.state.lock();
        let mobile = self.load(DeviceType::Mobile);
        let tablet = self.load(DeviceType::Tablet);
        let desktop = self.load(DeviceType::Desktop);

        DeviceStatistics {
            total_requests: mobile + tablet + desktop,
            mobile_requests: mobile,
            tablet_requests: tablet,
            desktop_requests: desktop,
            unknown_requests: self.load(DeviceType::Unknown),
            first_request_ms: state.first_request_ms,
            last_request_ms: state.last_request_ms,
        }
    }

    /// Cumulative count for a single device type, without locking.
    pub fn cumulative_count(&self, device_type: DeviceType) -> u64 {
        self.load(device_type)
    }

    /// Requests recorded as [`DeviceType::Unknown`].
    pub fn unknown_total(&self) -> u64 {
        self.load(DeviceType::Unknown)
    }

    /// Entries currently held in the rolling log, including any that have
    /// aged out since the last write.
    pub fn rolling_log_len(&self) -> usize {
        self.state.lock().rolling_log.len()
    }

    fn load(&self, device_type: DeviceType) -> u64 {
        self.cumulative[device_type.index()].load(Ordering::Relaxed)
    }

    fn cutoff(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.window.as_millis() as u64)
    }
}
