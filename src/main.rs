//! # Device Analytics Entry Point
//!
//! Reads one request per line from stdin and tracks it. A line is either
//! `<path>\t<user-agent>` or a bare user agent (counted as a request for `/`).
//! Usage is logged periodically; final summaries are logged and printed when
//! input ends or on Ctrl-C.
//!
//! The config file path comes from the first argument or
//! `DEVICE_ANALYTICS_CONFIG`; `DEVICE_ANALYTICS_*` variables override it.

use device_analytics::{
    AnalyticsConfig, DeviceCounters, MobileUsagePolicy, ReporterConfig, UsageReporter, UserAgentClassifier,
    UserAgentTracker,
};
use log::{error, info};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let config = load_config().inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!(
        "Device analytics starting: window={}m, report every {}s, tracking {}",
        config.rolling_window_minutes,
        config.report_interval_secs,
        if config.enabled { "enabled" } else { "disabled" }
    );

    let counters = Arc::new(DeviceCounters::with_window(config.rolling_window()));
    let tracker = UserAgentTracker::new(UserAgentClassifier::new(), Arc::clone(&counters), &config);
    let reporter = Arc::new(UsageReporter::new(Arc::clone(&counters), ReporterConfig::from(&config)));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reporter_task = tokio::spawn(Arc::clone(&reporter).run(shutdown_rx));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tracked = 0u64;
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    let (path, user_agent) = split_request_line(&line);
                    if tracker.track(path, Some(user_agent)).is_some() {
                        tracked += 1;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    let report = match reporter_task.await? {
        Some(report) => report,
        None => reporter.final_report(),
    };

    let policy =
        MobileUsagePolicy::new(config.mobile_usage_threshold).with_lookback_days(config.mobile_usage_lookback_days);
    let compact = policy.should_enable_compact_navigation_over_days(&counters);
    let recent = counters.daily_summary(policy.lookback_days());

    println!("Tracked requests: {}", tracked);
    println!("Cumulative: {}", serde_json::to_string(&report.cumulative)?);
    println!("Rolling:    {}", serde_json::to_string(&report.rolling)?);
    println!("Last {} day(s): {}", policy.lookback_days(), serde_json::to_string(&recent)?);
    println!("Statistics: {}", serde_json::to_string(&counters.statistics())?);
    println!("Compact navigation: {}", if compact { "enabled" } else { "disabled" });

    Ok(())
}

fn load_config() -> device_analytics::Result<AnalyticsConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DEVICE_ANALYTICS_CONFIG").ok());

    let config = match path {
        Some(path) => AnalyticsConfig::from_file(path)?,
        None => AnalyticsConfig::default(),
    };
    config.with_env_overrides()
}

fn split_request_line(line: &str) -> (&str, &str) {
    match line.split_once('\t') {
        Some((path, user_agent)) => (path.trim(), user_agent),
        None => ("/", line),
    }
}
