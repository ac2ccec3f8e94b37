//! Navigation policy
//!
//! Pure function of (rule tables, URL). No I/O, no interior state.

use serde::{Deserialize, Serialize};

use crate::app_links::{AppLinkRule, AppLinkTable};
use crate::tracking::{TrackerBlocklist, DEFAULT_TRACKERS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockReason {
    /// URL contains a blocklisted tracker pattern
    Tracker { pattern: String },
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockReason::Tracker { pattern } => write!(f, "tracker ({})", pattern),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PolicyDecision {
    Blocked { reason: BlockReason },
    /// Advisory: if the app can't be launched, load `url` in-session instead
    ExternalDispatch { app_id: String, url: String },
    Allowed { url: String },
}

impl PolicyDecision {
    /// Replace an external dispatch with loading the same URL in-session.
    pub fn or_fallback(self) -> Self {
        match self {
            PolicyDecision::ExternalDispatch { url, .. } => PolicyDecision::Allowed { url },
            other => other,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, PolicyDecision::Blocked { .. })
    }
}

/// Serializable rule tables; defaults are the built-in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyRules {
    pub trackers: Vec<String>,
    pub app_links: Vec<AppLinkRule>,
}

impl Default for PolicyRules {
    fn default() -> Self {
        Self {
            trackers: DEFAULT_TRACKERS.iter().map(|s| s.to_string()).collect(),
            app_links: AppLinkTable::default_rules(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NavigationPolicy {
    trackers: TrackerBlocklist,
    app_links: AppLinkTable,
}

impl NavigationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: &PolicyRules) -> Self {
        let policy = Self {
            trackers: TrackerBlocklist::with_patterns(rules.trackers.iter().cloned()),
            app_links: AppLinkTable::with_rules(rules.app_links.iter().cloned()),
        };

        tracing::debug!(
            trackers = policy.trackers.pattern_count(),
            app_links = policy.app_links.len(),
            "Built navigation policy"
        );

        policy
    }

    pub fn set_tracking_protection(&mut self, enabled: bool) {
        self.trackers.set_enabled(enabled);
    }

    pub fn tracking_protection(&self) -> bool {
        self.trackers.is_enabled()
    }

    pub fn trackers(&self) -> &TrackerBlocklist {
        &self.trackers
    }

    pub fn app_links(&self) -> &AppLinkTable {
        &self.app_links
    }

    /// Decide what to do with a destination URL. Blocking is checked before
    /// app links, so a tracker on an app-linked domain is still blocked.
    pub fn evaluate(&self, url: &str) -> PolicyDecision {
        if let Some(pattern) = self.trackers.matching_pattern(url) {
            return PolicyDecision::Blocked {
                reason: BlockReason::Tracker {
                    pattern: pattern.to_string(),
                },
            };
        }

        if let Some(app_id) = self.app_links.app_for(url) {
            return PolicyDecision::ExternalDispatch {
                app_id: app_id.to_string(),
                url: url.to_string(),
            };
        }

        PolicyDecision::Allowed {
            url: url.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tracker_blocked() {
        let policy = NavigationPolicy::new();
        assert_eq!(
            policy.evaluate("https://www.google-analytics.com/x"),
            PolicyDecision::Blocked {
                reason: BlockReason::Tracker {
                    pattern: "google-analytics.com".to_string()
                }
            }
        );
    }

    #[test]
    fn test_app_link_dispatch() {
        let policy = NavigationPolicy::new();
        let url = "https://youtube.com/watch?v=1";
        assert_eq!(
            policy.evaluate(url),
            PolicyDecision::ExternalDispatch {
                app_id: "com.google.android.youtube".to_string(),
                url: url.to_string(),
            }
        );
    }

    #[test]
    fn test_block_precedes_dispatch() {
        // facebook.com is app-linked, facebook.com/tr is a tracker
        let policy = NavigationPolicy::new();
        assert!(policy
            .evaluate("https://www.facebook.com/tr?id=1")
            .is_blocked());
        assert!(matches!(
            policy.evaluate("https://www.facebook.com/lynx"),
            PolicyDecision::ExternalDispatch { .. }
        ));
    }

    #[test]
    fn test_plain_url_allowed() {
        let policy = NavigationPolicy::new();
        assert_eq!(
            policy.evaluate("https://example.com/"),
            PolicyDecision::Allowed {
                url: "https://example.com/".to_string()
            }
        );
    }

    #[test]
    fn test_fallback() {
        let policy = NavigationPolicy::new();
        let url = "https://github.com/rust-lang/rust";
        assert_eq!(
            policy.evaluate(url).or_fallback(),
            PolicyDecision::Allowed {
                url: url.to_string()
            }
        );
        assert!(policy
            .evaluate("https://doubleclick.net/ad")
            .or_fallback()
            .is_blocked());
    }

    #[test]
    fn test_tracking_protection_off() {
        let mut policy = NavigationPolicy::new();
        policy.set_tracking_protection(false);
        assert!(!policy.tracking_protection());
        assert!(matches!(
            policy.evaluate("https://www.google-analytics.com/x"),
            PolicyDecision::Allowed { .. }
        ));
    }

    #[test]
    fn test_rules_from_json() {
        let rules: PolicyRules = serde_json::from_str(
            r#"{ "app_links": [{ "domain": "mastodon.social", "app_id": "org.joinmastodon.android" }] }"#,
        )
        .unwrap();

        // Trackers fall back to the built-ins
        assert_eq!(rules.trackers.len(), DEFAULT_TRACKERS.len());

        let policy = NavigationPolicy::from_rules(&rules);
        assert!(matches!(
            policy.evaluate("https://mastodon.social/@lynx"),
            PolicyDecision::ExternalDispatch { .. }
        ));
        assert!(matches!(
            policy.evaluate("https://youtube.com/"),
            PolicyDecision::Allowed { .. }
        ));
    }

    proptest! {
        #[test]
        fn prop_tracker_always_blocked(
            host in prop::sample::select(vec![
                "youtube.com", "github.com", "reddit.com", "example.org", "www.facebook.com",
            ]),
            tracker in prop::sample::select(DEFAULT_TRACKERS.to_vec()),
            path in "[a-z0-9/]{0,12}",
        ) {
            let url = format!("https://{}/{}?r={}", host, path, tracker);
            let policy = NavigationPolicy::new();
            prop_assert!(policy.evaluate(&url).is_blocked());
        }

        #[test]
        fn prop_evaluation_is_deterministic(url in "https://[a-z]{1,10}\\.(com|org|net)/[a-z0-9/]{0,10}") {
            let policy = NavigationPolicy::new();
            prop_assert_eq!(policy.evaluate(&url), policy.evaluate(&url));
        }
    }
}
