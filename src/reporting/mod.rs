//! Usage reporting over the device counters.
//!
//! Provides two reporting surfaces:
//! 1. **Periodic usage log** (UsageReporter): background task logging the rolling summary
//! 2. **Mobile usage policy** (MobileUsagePolicy): threshold decision on the mobile share

pub mod policy;
pub mod scheduler;

pub use policy::MobileUsagePolicy;
pub use scheduler::{ReporterConfig, UsageReport, UsageReporter};
