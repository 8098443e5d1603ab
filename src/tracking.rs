//! # Request Tracker
//!
//! The per-request hook: classify the caller's User-Agent and count it.
//! An HTTP middleware calls [`UserAgentTracker::track`] once per inbound
//! request.

use crate::classifier::UserAgentClassifier;
use crate::config::AnalyticsConfig;
use crate::counters::DeviceCounters;
use crate::types::DeviceType;
use log::debug;
use std::sync::Arc;

const STATIC_PREFIXES: [&str; 5] = ["/css/", "/js/", "/lib/", "/images/", "/api/"];

const STATIC_EXTENSIONS: [&str; 11] = [
    ".ico", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".css", ".js", ".map", ".woff", ".woff2",
];

/// Whether `path` is a page request rather than a static asset or API call.
pub fn is_page_request(path: &str) -> bool {
    // Cache-busting query strings and fragments don't change what is served
    let path = path.find(['?', '#']).map_or(path, |end| &path[..end]);
    let path = path.to_ascii_lowercase();

    if STATIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return false;
    }
    if path.contains("favicon") {
        return false;
    }
    !STATIC_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Classifies and counts inbound requests.
#[derive(Debug, Clone)]
pub struct UserAgentTracker {
    classifier: UserAgentClassifier,
    counters: Arc<DeviceCounters>,
    enabled: bool,
    track_static_assets: bool,
}

impl UserAgentTracker {
    pub fn new(classifier: UserAgentClassifier, counters: Arc<DeviceCounters>, config: &AnalyticsConfig) -> Self {
        Self {
            classifier,
            counters,
            enabled: config.enabled,
            track_static_assets: config.track_static_assets,
        }
    }

    /// Track one request.
    ///
    /// # Returns
    /// The device type that was counted, or `None` when tracking is disabled
    /// or `path` is a static asset.
    pub fn track(&self, path: &str, user_agent: Option<&str>) -> Option<DeviceType> {
        if !self.enabled {
            return None;
        }
        if !self.track_static_assets && !is_page_request(path) {
            return None;
        }

        let device_type = self.track_user_agent(user_agent);
        debug!(
            "UserAgent analytics: device_type={}, path={}, user_agent={:?}",
            device_type,
            path,
            user_agent.unwrap_or_default()
        );
        Some(device_type)
    }

    /// Classify and count a User-Agent without path filtering.
    pub fn track_user_agent(&self, user_agent: Option<&str>) -> DeviceType {
        let device_type = self.classifier.classify(user_agent);
        self.counters.increment(device_type);
        device_type
    }

    pub fn counters(&self) -> &Arc<DeviceCounters> {
        &self.counters
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X) AppleWebKit/605.1.15";

    fn tracker(config: &AnalyticsConfig) -> UserAgentTracker {
        UserAgentTracker::new(UserAgentClassifier::new(), Arc::new(DeviceCounters::new()), config)
    }

    #[test]
    fn test_page_request_filter() {
        assert!(is_page_request("/"));
        assert!(is_page_request("/Index"));
        assert!(is_page_request("/GithubProfile/octocat"));
        assert!(!is_page_request("/css/site.css"));
        assert!(!is_page_request("/JS/site.js"));
        assert!(!is_page_request("/lib/bootstrap/dist/js/bootstrap.bundle.min.js"));
        assert!(!is_page_request("/images/logo.png"));
        assert!(!is_page_request("/api/messages"));
        assert!(!is_page_request("/favicon.ico"));
        assert!(!is_page_request("/assets/banner.SVG"));
        assert!(!is_page_request("/site.js?v=3"));
        assert!(!is_page_request("/logo.png?x=1"));
        assert!(!is_page_request("/fonts/icons.woff2#iefix"));
        assert!(is_page_request("/Search?q=styles.css"));
        assert!(is_page_request("/Index#top"));
    }

    #[test]
    fn test_track_counts_page_requests() {
        let tracker = tracker(&AnalyticsConfig::default());

        assert_eq!(tracker.track("/", Some(IPHONE)), Some(DeviceType::Mobile));
        assert_eq!(tracker.track("/About", None), Some(DeviceType::Desktop));

        let summary = tracker.counters().cumulative_summary();
        assert_eq!((summary.mobile, summary.desktop), (1, 1));
    }

    #[test]
    fn test_track_skips_static_assets() {
        let tracker = tracker(&AnalyticsConfig::default());

        assert_eq!(tracker.track("/css/site.css", Some(IPHONE)), None);
        assert_eq!(tracker.counters().cumulative_summary().total(), 0);
    }

    #[test]
    fn test_track_static_assets_when_configured() {
        let config = AnalyticsConfig {
            track_static_assets: true,
            ..Default::default()
        };
        let tracker = tracker(&config);

        assert_eq!(tracker.track("/css/site.css", Some(IPHONE)), Some(DeviceType::Mobile));
    }

    #[test]
    fn test_disabled_tracker_counts_nothing() {
        let config = AnalyticsConfig {
            enabled: false,
            ..Default::default()
        };
        let tracker = tracker(&config);

        assert!(!tracker.is_enabled());
        assert_eq!(tracker.track("/", Some(IPHONE)), None);
        assert_eq!(tracker.counters().cumulative_summary().total(), 0);
    }
}
