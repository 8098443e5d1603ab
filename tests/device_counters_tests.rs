//! Integration tests for the device counters store.
//!
//! Tests verify:
//! - Cumulative and rolling summaries for simple sequences
//! - Rolling window expiry with an injected clock
//! - Exact counts under concurrent increments and reads
//! - Per-day metrics and the multi-day mobile share
//! - Reset for isolation between runs

use device_analytics::{DeviceCounters, DeviceType, ManualClock, MobileUsagePolicy};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn counters_at(start_ms: u64) -> (Arc<DeviceCounters>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start_ms));
    let counters = Arc::new(DeviceCounters::with_clock(HOUR, clock.clone()));
    (counters, clock)
}

// ============================================================================
// BASIC FUNCTIONALITY TESTS
// ============================================================================

#[test]
fn test_mobile_twice_desktop_once() {
    let counters = DeviceCounters::new();

    counters.increment(DeviceType::Mobile);
    counters.increment(DeviceType::Mobile);
    counters.increment(DeviceType::Desktop);

    let cumulative = counters.cumulative_summary();
    assert_eq!(cumulative.window_minutes, -1);
    assert_eq!(cumulative.mobile, 2);
    assert_eq!(cumulative.tablet, 0);
    assert_eq!(cumulative.desktop, 1);

    let rolling = counters.rolling_summary();
    assert_eq!(rolling.window_minutes, 60);
    assert_eq!(rolling.mobile, 2);
    assert_eq!(rolling.tablet, 0);
    assert_eq!(rolling.desktop, 1);
}

#[test]
fn test_statistics_from_snapshot() {
    let counters = DeviceCounters::new();
    for _ in 0..30 {
        counters.increment(DeviceType::Mobile);
    }
    for _ in 0..20 {
        counters.increment(DeviceType::Tablet);
    }
    for _ in 0..50 {
        counters.increment(DeviceType::Desktop);
    }

    let stats = counters.cumulative_summary().statistics();
    assert_eq!(stats.total_requests, 100);
    assert_eq!(stats.mobile_percentage(), 30.0);
    assert_eq!(stats.tablet_percentage(), 20.0);
    assert_eq!(stats.desktop_percentage(), 50.0);
}

// ============================================================================
// ROLLING WINDOW TESTS
// ============================================================================

#[test]
fn test_fresh_increment_is_in_rolling_summary() {
    let (counters, _clock) = counters_at(5_000_000);

    counters.increment(DeviceType::Tablet);

    assert_eq!(counters.rolling_summary().tablet, 1);
}

#[test]
fn test_increment_expires_after_window() {
    let (counters, clock) = counters_at(5_000_000);

    counters.increment(DeviceType::Mobile);
    clock.advance(HOUR + Duration::from_secs(1));

    let rolling = counters.rolling_summary();
    assert_eq!(rolling.mobile, 0, "Expired increment must leave the rolling window");

    let cumulative = counters.cumulative_summary();
    assert_eq!(cumulative.mobile, 1, "Cumulative count must keep the increment");
}

#[test]
fn test_rolling_counts_match_entries_inside_window() {
    let (counters, clock) = counters_at(0);

    // One increment per minute for two hours, alternating types
    for minute in 0..120u64 {
        let device_type = match minute % 3 {
            0 => DeviceType::Mobile,
            1 => DeviceType::Tablet,
            _ => DeviceType::Desktop,
        };
        counters.increment(device_type);
        clock.advance(Duration::from_secs(60));
    }

    // Clock is at minute 120, so minutes 60..120 are still inside the window
    let rolling = counters.rolling_summary();
    assert_eq!(rolling.total(), 60);
    assert_eq!(rolling.mobile, 20);
    assert_eq!(rolling.tablet, 20);
    assert_eq!(rolling.desktop, 20);

    let cumulative = counters.cumulative_summary();
    assert_eq!(cumulative.total(), 120);
}

#[test]
fn test_cumulative_never_decreases() {
    let (counters, clock) = counters_at(0);
    let mut previous = 0;

    for step in 0..50 {
        counters.increment(DeviceType::Desktop);
        clock.advance(Duration::from_secs(10 * 60));
        let total = counters.cumulative_summary().total();
        assert!(total > previous, "step {}: {} <= {}", step, total, previous);
        previous = total;
    }
}

// ============================================================================
// CONCURRENT ACCESS TESTS
// ============================================================================

#[test]
fn test_concurrent_increments_are_exact() {
    let counters = Arc::new(DeviceCounters::new());
    let mut handles = vec![];

    // 8 threads, each with its own mix of device types
    for thread_id in 0..8usize {
        let counters_clone = Arc::clone(&counters);
        let handle = thread::spawn(move || {
            for i in 0..1_000usize {
                let device_type = match (thread_id + i) % 3 {
                    0 => DeviceType::Mobile,
                    1 => DeviceType::Tablet,
                    _ => DeviceType::Desktop,
                };
                counters_clone.increment(device_type);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let mut expected = [0u64; 3];
    for thread_id in 0..8usize {
        for i in 0..1_000usize {
            expected[(thread_id + i) % 3] += 1;
        }
    }

    let cumulative = counters.cumulative_summary();
    assert_eq!(cumulative.total(), 8_000);
    assert_eq!(cumulative.mobile, expected[0]);
    assert_eq!(cumulative.tablet, expected[1]);
    assert_eq!(cumulative.desktop, expected[2]);

    let rolling = counters.rolling_summary();
    assert_eq!(rolling.total(), 8_000);
    assert_eq!(counters.rolling_log_len(), 8_000);
}

#[test]
fn test_concurrent_reads_never_see_torn_snapshots() {
    let counters = Arc::new(DeviceCounters::new());
    let mut handles = vec![];

    // Writers always add one mobile and one desktop as a pair
    for _ in 0..4 {
        let counters_clone = Arc::clone(&counters);
        handles.push(thread::spawn(move || {
            for _ in 0..500 {
                counters_clone.increment(DeviceType::Mobile);
                counters_clone.increment(DeviceType::Desktop);
            }
        }));
    }

    // Readers check that totals only ever grow
    for _ in 0..2 {
        let counters_clone = Arc::clone(&counters);
        handles.push(thread::spawn(move || {
            let mut last_total = 0;
            for _ in 0..500 {
                let snapshot = counters_clone.cumulative_summary();
                assert!(snapshot.total() >= last_total);
                assert!(snapshot.mobile.abs_diff(snapshot.desktop) <= 4);
                last_total = snapshot.total();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let cumulative = counters.cumulative_summary();
    assert_eq!(cumulative.mobile, 2_000);
    assert_eq!(cumulative.desktop, 2_000);
}

// ============================================================================
// DAILY METRICS TESTS
// ============================================================================

#[test]
fn test_week_of_traffic_drives_mobile_share() {
    let (counters, clock) = counters_at(0);

    // Mobile share grows by one request per day: day d has d mobile and 4 desktop
    for day in 0..7u64 {
        for _ in 0..day {
            counters.increment(DeviceType::Mobile);
        }
        for _ in 0..4 {
            counters.increment(DeviceType::Desktop);
        }
        if day < 6 {
            clock.advance(DAY);
        }
    }

    let usage = counters.daily_usage();
    assert_eq!(usage.first().map(|m| (m.day, m.device_type)), Some((0, DeviceType::Desktop)));
    assert_eq!(usage.last().map(|m| (m.day, m.count)), Some((6, 6)));

    // 21 mobile and 28 desktop over the week
    let week = counters.daily_summary(7);
    assert_eq!((week.mobile, week.desktop), (21, 28));
    assert_eq!(week.first_request_ms, Some(0));

    let policy = MobileUsagePolicy::default();
    assert!(policy.should_enable_compact_navigation_over_days(&counters));
    assert!(!MobileUsagePolicy::new(50.0).should_enable_compact_navigation_over_days(&counters));

    // The last three days alone: 15 mobile of 27
    assert!(MobileUsagePolicy::new(55.0)
        .with_lookback_days(3)
        .should_enable_compact_navigation_over_days(&counters));
}

#[test]
fn test_first_and_last_request_survive_window_expiry() {
    let (counters, clock) = counters_at(1_000);

    counters.increment(DeviceType::Tablet);
    clock.advance(HOUR * 3);
    counters.increment(DeviceType::Unknown);

    let stats = counters.statistics();
    assert_eq!(stats.total_requests, 1);
    assert_eq!(stats.unknown_requests, 1);
    assert_eq!(stats.first_request_ms, Some(1_000));
    assert_eq!(stats.last_request_ms, Some(1_000 + 3 * 60 * 60 * 1000));

    let rolling = counters.rolling_summary();
    assert_eq!(rolling.total(), 0);
    assert_eq!(rolling.first_request_ms, None);
}

// ============================================================================
// RESET TESTS
// ============================================================================

#[test]
fn test_reset_isolates_runs() {
    let (counters, _clock) = counters_at(1_000);

    counters.increment(DeviceType::Mobile);
    counters.increment(DeviceType::Tablet);
    counters.reset();

    assert_eq!(counters.cumulative_summary().total(), 0);
    assert_eq!(counters.rolling_summary().total(), 0);

    counters.increment(DeviceType::Desktop);
    let cumulative = counters.cumulative_summary();
    assert_eq!((cumulative.mobile, cumulative.tablet, cumulative.desktop), (0, 0, 1));
}
