//! # Device Report CLI
//!
//! Command-line tool for classifying User-Agent strings and summarizing
//! device usage.
//!
//! Usage:
//!   device_report classify <user-agent>
//!   device_report summarize <file> [--format pretty|json|summary] [--threshold N]

use clap::{Parser, Subcommand};
use device_analytics::{
    AnalyticsError, CounterSnapshot, DeviceCounters, DeviceType, MobileUsagePolicy, UserAgentClassifier,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "device_report")]
#[command(about = "Classify User-Agent strings and summarize device usage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single User-Agent string
    Classify {
        /// Raw User-Agent header value
        user_agent: String,
    },

    /// Summarize a file with one User-Agent per line
    Summarize {
        /// Input file
        file: PathBuf,

        /// Output format: json, pretty, summary
        #[arg(short, long, default_value = "pretty")]
        format: String,

        /// Mobile share (percent) that turns on compact navigation
        #[arg(short, long, default_value_t = 30.0)]
        threshold: f64,
    },
}

fn main() -> Result<(), AnalyticsError> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "warn")).init();

    let cli = Cli::parse();
    let classifier = UserAgentClassifier::new();

    match cli.command {
        Commands::Classify { user_agent } => {
            println!("{}", classifier.classify_str(&user_agent));
        }

        Commands::Summarize {
            file,
            format,
            threshold,
        } => {
            let contents = std::fs::read_to_string(&file).map_err(|source| AnalyticsError::Io {
                path: file.clone(),
                source,
            })?;

            // Offline input has no timestamps: everything lands in one window.
            let counters = DeviceCounters::new();
            for line in contents.lines().filter(|line| !line.trim().is_empty()) {
                counters.increment(classifier.classify_str(line));
            }
            let snapshot = counters.cumulative_summary();
            let policy = MobileUsagePolicy::new(threshold);

            match format.as_str() {
                "json" => {
                    let stats = snapshot.statistics();
                    let output = serde_json::json!({
                        "summary": snapshot,
                        "statistics": stats,
                        "mobilePercentage": stats.mobile_percentage(),
                        "tabletPercentage": stats.tablet_percentage(),
                        "desktopPercentage": stats.desktop_percentage(),
                        "compactNavigation": policy.should_enable_compact_navigation(&snapshot),
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                "summary" => {
                    println!(
                        "total={} mobile={} tablet={} desktop={}",
                        snapshot.total(),
                        snapshot.mobile,
                        snapshot.tablet,
                        snapshot.desktop
                    );
                }
                _ => print_pretty(&snapshot, &policy),
            }
        }
    }

    Ok(())
}

fn print_pretty(snapshot: &CounterSnapshot, policy: &MobileUsagePolicy) {
    println!("📊 Device Usage\n");
    println!("Total Requests:  {}", snapshot.total());
    for device_type in [DeviceType::Mobile, DeviceType::Tablet, DeviceType::Desktop] {
        println!(
            "{:<16} {} ({:.1}%)",
            format!("{}:", device_type),
            snapshot.count(device_type),
            snapshot.percentage(device_type)
        );
    }
    println!(
        "\nCompact navigation (≥{}% mobile): {}",
        policy.threshold_percent(),
        if policy.should_enable_compact_navigation(snapshot) {
            "✅ enabled"
        } else {
            "🚫 disabled"
        }
    );
}
