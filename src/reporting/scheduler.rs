//! Scheduled usage reporting - background task that logs device usage.
//!
//! Every `interval` the reporter logs the rolling summary as a single
//! structured line:
//!
//! ```text
//! DeviceUsageSummary { windowMinutes=60, mobile=12, tablet=3, desktop=40 }
//! ```
//!
//! When the shutdown signal fires it logs the final cumulative and rolling
//! summaries and returns them.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant};

use crate::config::AnalyticsConfig;
use crate::counters::{CounterSnapshot, DeviceCounters};
use log::{info, warn};

/// Configuration for the usage reporter.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Interval between usage log lines
    pub interval: Duration,
    /// Whether the reporter is enabled
    pub enabled: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
            enabled: true,
        }
    }
}

impl From<&AnalyticsConfig> for ReporterConfig {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            interval: config.report_interval(),
            enabled: config.report_enabled,
        }
    }
}

/// Summaries logged when the reporter shuts down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageReport {
    pub cumulative: CounterSnapshot,
    pub rolling: CounterSnapshot,
}

/// Periodic logger of device usage.
///
/// Runs as a tokio task spawned next to the request handlers.
#[derive(Debug)]
pub struct UsageReporter {
    /// Counters being reported on
    counters: Arc<DeviceCounters>,
    /// Reporter configuration
    config: ReporterConfig,
    /// Most recent periodic snapshot
    last_report: RwLock<Option<CounterSnapshot>>,
    /// Periodic lines logged so far
    reports_emitted: AtomicU64,
}

impl UsageReporter {
    /// A zero interval cannot drive a ticker, so it disables the reporter.
    pub fn new(counters: Arc<DeviceCounters>, mut config: ReporterConfig) -> Self {
        if config.enabled && config.interval.is_zero() {
            warn!("Device usage report interval is zero, disabling the reporter");
            config.enabled = false;
        }

        Self {
            counters,
            config,
            last_report: RwLock::new(None),
            reports_emitted: AtomicU64::new(0),
        }
    }

    /// The rolling snapshot logged by the most recent tick, if any.
    pub fn last_report(&self) -> Option<CounterSnapshot> {
        *self.last_report.read()
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn reports_emitted(&self) -> u64 {
        self.reports_emitted.load(Ordering::Relaxed)
    }

    /// Runs the reporter until `shutdown` flips to `true` or its sender drops.
    ///
    /// If the reporter is disabled in config, this returns immediately with
    /// `None`.
    ///
    /// # Example
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use device_analytics::{DeviceCounters, ReporterConfig, UsageReporter};
    /// # async fn demo() {
    /// let counters = Arc::new(DeviceCounters::new());
    /// let reporter = Arc::new(UsageReporter::new(counters, ReporterConfig::default()));
    /// let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    ///
    /// let handle = tokio::spawn(reporter.clone().run(shutdown_rx));
    /// // ... serve requests ...
    /// let _ = shutdown_tx.send(true);
    /// let _final_report = handle.await;
    /// # }
    /// ```
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> Option<UsageReport> {
        if !self.config.enabled {
            info!("Device usage reporting is disabled, skipping");
            return None;
        }

        info!(
            "Device usage reporting started with {}-second interval",
            self.config.interval.as_secs()
        );

        // First line after one full interval, not at startup
        let mut ticker = interval_at(Instant::now() + self.config.interval, self.config.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.report_rolling(),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        let report = self.final_report();
        info!("Device usage reporting stopped");
        Some(report)
    }

    /// Logs one rolling summary line.
    fn report_rolling(&self) {
        let rolling = self.counters.rolling_summary();
        info!("DeviceUsageSummary {}", format_summary(&rolling));

        *self.last_report.write() = Some(rolling);
        self.reports_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Logs and returns the shutdown summaries.
    pub fn final_report(&self) -> UsageReport {
        let cumulative = self.counters.cumulative_summary();
        let rolling = self.counters.rolling_summary();

        info!(
            "Final DeviceUsageSummary - Cumulative since startup: {}",
            format_summary(&cumulative)
        );
        info!("Final DeviceUsageSummary - Rolling window: {}", format_summary(&rolling));

        UsageReport { cumulative, rolling }
    }
}

/// Renders a snapshot as `{ windowMinutes=.., mobile=.., tablet=.., desktop=.. }`.
pub fn format_summary(snapshot: &CounterSnapshot) -> String {
    format!(
        "{{ windowMinutes={}, mobile={}, tablet={}, desktop={} }}",
        snapshot.window_minutes, snapshot.mobile, snapshot.tablet, snapshot.desktop
    )
}
