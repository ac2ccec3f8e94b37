//! LibreLynx Privacy Policy
//!
//! Decides what happens to a destination URL before any session loads it:
//!
//! 1. URL contains a known tracker pattern → blocked
//! 2. Host belongs to an app with a native client → hand off to the app
//! 3. Otherwise → load in the session
//!
//! First match wins, and the decision depends only on the URL and the rule
//! tables, never on timing or previous calls.

mod app_links;
mod policy;
mod tracking;

pub use app_links::{AppLinkRule, AppLinkTable};
pub use policy::{BlockReason, NavigationPolicy, PolicyDecision, PolicyRules};
pub use tracking::{TrackerBlocklist, DEFAULT_TRACKERS};
