//! Key-value store abstraction
//!
//! Every value is a string keyed by `(namespace, key)`. Namespaces are
//! independent: clearing one never touches another.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Single key holding the pipe-delimited, most-recent-first URL list
    HistoryOrder,
    /// url -> display title for every URL in the history order list
    HistoryTitles,
    /// url -> title, no ordering
    Bookmarks,
    /// Shell preferences (search provider, ...)
    Preferences,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::HistoryOrder,
        Namespace::HistoryTitles,
        Namespace::Bookmarks,
        Namespace::Preferences,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::HistoryOrder => "history_order",
            Namespace::HistoryTitles => "history_titles",
            Namespace::Bookmarks => "bookmarks",
            Namespace::Preferences => "preferences",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Namespace {
    type Err = StorageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Namespace::ALL
            .into_iter()
            .find(|ns| ns.as_str() == s)
            .ok_or_else(|| StorageError::UnknownNamespace(s.to_string()))
    }
}

/// Durable string map used by the history ring, bookmarks and preferences.
///
/// Implementations serialize their own writes; callers may share one store
/// behind an `Arc` across threads.
pub trait KeyValueStore: Send + Sync {
    fn get_string(&self, namespace: Namespace, key: &str) -> Result<Option<String>>;

    fn put_string(&self, namespace: Namespace, key: &str, value: &str) -> Result<()>;

    fn remove(&self, namespace: Namespace, key: &str) -> Result<()>;

    fn clear_namespace(&self, namespace: Namespace) -> Result<()>;

    /// All `(key, value)` pairs in the namespace, sorted by key.
    fn entries(&self, namespace: Namespace) -> Result<Vec<(String, String)>>;

    fn get_string_or(&self, namespace: Namespace, key: &str, default: &str) -> Result<String> {
        Ok(self
            .get_string(namespace, key)?
            .unwrap_or_else(|| default.to_string()))
    }
}
