//! # Device Counters
//!
//! In-memory request counters per device type:
//! - **Cumulative**: every increment since construction (or the last reset)
//! - **Rolling**: increments inside the trailing window (60 minutes by default)
//! - **Daily**: per-day, per-type access metrics for multi-day lookbacks
//!
//! The store is an explicitly constructed service. Share it with `Arc` between
//! the request hook and whatever reports on it.

pub mod daily;
pub mod snapshot;
pub mod store;

pub use daily::{AccessMetrics, DEFAULT_DAILY_RETENTION_DAYS};
pub use snapshot::{CounterSnapshot, DeviceStatistics, CUMULATIVE_WINDOW};
pub use store::{DeviceCounters, DEFAULT_ROLLING_WINDOW};
