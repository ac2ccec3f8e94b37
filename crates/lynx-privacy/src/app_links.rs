//! App-link table
//!
//! Maps web domains to the package id of a native client that can open
//! them. A rule for `youtube.com` also covers `m.youtube.com` and
//! `www.youtube.com`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

const YOUTUBE: &str = "com.google.android.youtube";
const AMAZON: &str = "com.amazon.mShop.android.shopping";

const DEFAULT_APP_LINKS: &[(&str, &str)] = &[
    ("youtube.com", YOUTUBE),
    ("youtu.be", YOUTUBE),
    ("twitter.com", "com.twitter.android"),
    ("instagram.com", "com.instagram.android"),
    ("facebook.com", "com.facebook.katana"),
    ("reddit.com", "com.reddit.frontpage"),
    ("spotify.com", "com.spotify.music"),
    ("netflix.com", "com.netflix.mediaclient"),
    ("amazon.com", AMAZON),
    ("amazon.co.uk", AMAZON),
    ("github.com", "com.github.android"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppLinkRule {
    pub domain: String,
    pub app_id: String,
}

#[derive(Debug, Clone)]
pub struct AppLinkTable {
    /// domain -> app id
    domains: HashMap<String, String>,
}

impl AppLinkTable {
    pub fn new() -> Self {
        Self::with_rules(Self::default_rules())
    }

    pub fn with_rules<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = AppLinkRule>,
    {
        Self {
            domains: rules
                .into_iter()
                .map(|rule| (rule.domain.trim().to_lowercase(), rule.app_id))
                .filter(|(domain, app_id)| !domain.is_empty() && !app_id.is_empty())
                .collect(),
        }
    }

    pub fn default_rules() -> Vec<AppLinkRule> {
        DEFAULT_APP_LINKS
            .iter()
            .map(|(domain, app_id)| AppLinkRule {
                domain: domain.to_string(),
                app_id: app_id.to_string(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// App id for the URL's host, checking the host and then each parent
    /// domain. URLs without a parseable host never match.
    pub fn app_for(&self, url: &str) -> Option<&str> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_lowercase();

        let parts: Vec<&str> = host.split('.').collect();
        for i in 0..parts.len() {
            let parent = parts[i..].join(".");
            if let Some(app_id) = self.domains.get(&parent) {
                return Some(app_id.as_str());
            }
        }

        None
    }
}

impl Default for AppLinkTable {
    fn default() -> Self {
        Self::new()
    }
}
