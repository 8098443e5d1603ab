//! # User-Agent Classifier
//!
//! Maps a raw `User-Agent` header value to a [`DeviceType`].
//!
//! Matching is ordered and case-insensitive:
//! 1. explicit tablet markers (iPad, Kindle, Nexus 7/9/10, SM-T..., ...) -> Tablet
//! 2. Android: with a "mobile" token -> Mobile, without -> Tablet
//! 3. mobile markers (iPhone, BlackBerry, Opera Mini, ...) -> Mobile
//! 4. anything else, including empty input -> Desktop
//!
//! The classifier never yields [`DeviceType::Unknown`].

use crate::types::DeviceType;
use regex::Regex;
use std::sync::LazyLock;

// Patterns run against the lowercased header.
static TABLET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"ipad|\b(?:tablet|kindle|nook|nexus\s(?:7|9|10)\b|galaxy\stab|xoom|tab\s|playbook|sm-t\d+)",
    )
    .expect("invalid regex")
});

static MOBILE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:mobile|iphone|ipod|android|blackberry|opera\smini|iemobile|windows\sphone|palm|smartphone|j2me|midp|pocket|pda)",
    )
    .expect("invalid regex")
});

// "mobile" as a token of its own, so "automobile" doesn't count.
static MOBILE_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bmobile\b").expect("invalid regex"));

/// Stateless User-Agent classifier.
///
/// Cheap to construct and share; the compiled patterns are process-wide.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAgentClassifier;

impl UserAgentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a User-Agent header value.
    ///
    /// Missing, empty and whitespace-only values classify as
    /// [`DeviceType::Desktop`].
    pub fn classify(&self, user_agent: Option<&str>) -> DeviceType {
        let ua = match user_agent.map(str::trim) {
            Some(ua) if !ua.is_empty() => ua.to_ascii_lowercase(),
            _ => return DeviceType::Desktop,
        };

        if TABLET_REGEX.is_match(&ua) {
            return DeviceType::Tablet;
        }

        if ua.contains("android") {
            return if MOBILE_TOKEN_REGEX.is_match(&ua) {
                DeviceType::Mobile
            } else {
                DeviceType::Tablet
            };
        }

        if MOBILE_REGEX.is_match(&ua) {
            return DeviceType::Mobile;
        }

        DeviceType::Desktop
    }

    /// Shorthand for `classify(Some(user_agent))`.
    pub fn classify_str(&self, user_agent: &str) -> DeviceType {
        self.classify(Some(user_agent))
    }
}
