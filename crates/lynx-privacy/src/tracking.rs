//! Tracking protection
//!
//! Substring blocklist checked against the whole URL, so path-scoped
//! patterns like `facebook.com/tr` work alongside plain domains.

use std::collections::BTreeSet;

/// Tracker patterns blocked out of the box
pub const DEFAULT_TRACKERS: &[&str] = &[
    // Google
    "google-analytics.com",
    "googletagmanager.com",
    "doubleclick.net",
    "googlesyndication.com",
    // Facebook pixel
    "facebook.com/tr",
];

#[derive(Debug, Clone)]
pub struct TrackerBlocklist {
    /// Lowercased patterns, ordered so the reported match is stable
    patterns: BTreeSet<String>,
    /// Whether protection is enabled
    enabled: bool,
}

impl TrackerBlocklist {
    pub fn new() -> Self {
        Self::with_patterns(DEFAULT_TRACKERS.iter().map(|s| s.to_string()))
    }

    pub fn with_patterns<I>(patterns: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            enabled: true,
        }
    }

    /// Enable or disable protection
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check if protection is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn add_pattern(&mut self, pattern: &str) {
        let pattern = pattern.trim().to_lowercase();
        if !pattern.is_empty() {
            self.patterns.insert(pattern);
        }
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// First pattern contained in `url`, if protection is on.
    pub fn matching_pattern(&self, url: &str) -> Option<&str> {
        if !self.enabled {
            return None;
        }

        let url = url.to_lowercase();
        self.patterns
            .iter()
            .find(|pattern| url.contains(pattern.as_str()))
            .map(String::as_str)
    }

    pub fn should_block(&self, url: &str) -> bool {
        self.matching_pattern(url).is_some()
    }
}

impl Default for TrackerBlocklist {
    fn default() -> Self {
        Self::new()
    }
}
