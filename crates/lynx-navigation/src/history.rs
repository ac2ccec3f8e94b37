//! History ring
//!
//! Most-recent-first list of completed page loads, unique by URL and capped
//! at [`HISTORY_CAPACITY`]. Every mutation is flushed straight to the store:
//!
//! - `HistoryOrder` / [`HISTORY_ORDER_KEY`] holds `url1|url2|...|urlN`
//! - `HistoryTitles` maps each listed URL to its display title
//!
//! The order list is authoritative for membership. Store failures are logged
//! and swallowed; the in-memory ring stays the source of truth and the next
//! mutation rewrites both namespaces in full.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use lynx_storage::{KeyValueStore, Namespace};

use crate::classifier::BLANK_PAGE;
use crate::Result;

pub const HISTORY_CAPACITY: usize = 20;

pub const HISTORY_ORDER_KEY: &str = "history_order";

const SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
}

enum Change {
    Visited { evicted: Vec<HistoryEntry> },
    Removed(String),
    Cleared,
}

pub struct HistoryRing {
    entries: Vec<HistoryEntry>,
    store: Arc<dyn KeyValueStore>,
    /// Last flush failed; store contents can't be trusted for incremental writes
    stale: bool,
}

impl HistoryRing {
    /// Load the ring from the store, starting empty if the store is unreadable.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        match Self::try_load(Arc::clone(&store)) {
            Ok(ring) => ring,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load history, starting empty");
                Self {
                    entries: Vec::new(),
                    store,
                    stale: true,
                }
            }
        }
    }

    pub fn try_load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let order = store.get_string_or(Namespace::HistoryOrder, HISTORY_ORDER_KEY, "")?;
        let titles: HashMap<String, String> =
            store.entries(Namespace::HistoryTitles)?.into_iter().collect();

        let entries = decode(&order, &titles);
        tracing::info!(count = entries.len(), "Loaded history");

        Ok(Self {
            entries,
            store,
            stale: false,
        })
    }

    /// Record a completed load. Empty and blank-page URLs are ignored.
    pub fn record_visit(&mut self, url: &str, title: &str) {
        let url = url.trim();
        if url.is_empty() || url == BLANK_PAGE {
            return;
        }

        let url = stored_url(url);
        let title = if title.trim().is_empty() {
            url.clone()
        } else {
            title.to_string()
        };

        self.entries.retain(|entry| entry.url != url);
        self.entries.insert(0, HistoryEntry { url, title });

        let evicted = if self.entries.len() > HISTORY_CAPACITY {
            self.entries.split_off(HISTORY_CAPACITY)
        } else {
            Vec::new()
        };

        tracing::debug!(url = %self.entries[0].url, evicted = evicted.len(), "Recorded visit");
        self.persist(Change::Visited { evicted });
    }

    /// Remove the entry for `url`. Returns whether anything was removed.
    pub fn remove_visit(&mut self, url: &str) -> bool {
        let url = stored_url(url);
        let Some(index) = self.entries.iter().position(|entry| entry.url == url) else {
            return false;
        };

        let removed = self.entries.remove(index);
        tracing::debug!(url = %removed.url, "Removed history entry");
        self.persist(Change::Removed(removed.url));
        true
    }

    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        tracing::info!(count, "Cleared history");
        self.persist(Change::Cleared);
    }

    /// Entries, most recent first.
    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn title_for(&self, url: &str) -> Option<&str> {
        let url = stored_url(url);
        self.entries
            .iter()
            .find(|entry| entry.url == url)
            .map(|entry| entry.title.as_str())
    }

    /// Case-insensitive substring match over url and title, recency order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<HistoryEntry> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|entry| {
                needle.is_empty()
                    || entry.url.to_lowercase().contains(&needle)
                    || entry.title.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect()
    }

    fn persist(&mut self, change: Change) {
        let result = match change {
            Change::Cleared => self.write_cleared(),
            _ if self.stale => self.write_all(),
            Change::Visited { evicted } => self.write_visit(&evicted),
            Change::Removed(url) => self.write_removal(&url),
        };

        match result {
            Ok(()) => self.stale = false,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist history, will retry on next change");
                self.stale = true;
            }
        }
    }

    fn write_visit(&self, evicted: &[HistoryEntry]) -> Result<()> {
        let newest = &self.entries[0];
        self.store
            .put_string(Namespace::HistoryTitles, &newest.url, &newest.title)?;
        for entry in evicted {
            self.store.remove(Namespace::HistoryTitles, &entry.url)?;
        }
        self.write_order()
    }

    fn write_removal(&self, url: &str) -> Result<()> {
        self.store.remove(Namespace::HistoryTitles, url)?;
        self.write_order()
    }

    fn write_cleared(&self) -> Result<()> {
        self.store.clear_namespace(Namespace::HistoryTitles)?;
        self.store.clear_namespace(Namespace::HistoryOrder)?;
        Ok(())
    }

    fn write_all(&self) -> Result<()> {
        self.store.clear_namespace(Namespace::HistoryTitles)?;
        for entry in &self.entries {
            self.store
                .put_string(Namespace::HistoryTitles, &entry.url, &entry.title)?;
        }
        self.write_order()
    }

    fn write_order(&self) -> Result<()> {
        self.store.put_string(
            Namespace::HistoryOrder,
            HISTORY_ORDER_KEY,
            &encode(&self.entries),
        )?;
        Ok(())
    }
}

/// Form a URL takes in the ring; the separator can't appear unescaped.
fn stored_url(url: &str) -> String {
    url.replace(SEPARATOR, "%7C")
}

fn encode(entries: &[HistoryEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.url.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

fn decode(order: &str, titles: &HashMap<String, String>) -> Vec<HistoryEntry> {
    let mut seen = HashSet::new();
    order
        .split(SEPARATOR)
        .filter(|url| !url.is_empty())
        .filter(|url| seen.insert(*url))
        .take(HISTORY_CAPACITY)
        .map(|url| HistoryEntry {
            url: url.to_string(),
            title: titles
                .get(url)
                .cloned()
                .unwrap_or_else(|| url.to_string()),
        })
        .collect()
}
