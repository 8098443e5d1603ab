//! # Device Analytics
//!
//! Classifies HTTP `User-Agent` headers into coarse device types and keeps
//! in-memory request counts per type, both cumulative and over a rolling
//! window.
//!
//! - [`classifier`]: User-Agent to [`DeviceType`]
//! - [`counters`]: cumulative, rolling-window and per-day counters with snapshots
//! - [`tracking`]: per-request hook combining the two
//! - [`reporting`]: periodic usage logging and the mobile usage policy
//! - [`config`]: settings from defaults, JSON files and the environment

pub mod classifier;
pub mod config;
pub mod counters;
pub mod error;
pub mod reporting;
pub mod tracking;
pub mod types;

pub use classifier::UserAgentClassifier;
pub use config::AnalyticsConfig;
pub use counters::{AccessMetrics, CounterSnapshot, DeviceCounters, DeviceStatistics};
pub use error::{AnalyticsError, Result};
pub use reporting::{MobileUsagePolicy, ReporterConfig, UsageReport, UsageReporter};
pub use tracking::{is_page_request, UserAgentTracker};
pub use types::{Clock, DeviceType, ManualClock, SystemClock};
