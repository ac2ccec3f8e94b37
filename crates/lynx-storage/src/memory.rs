//! In-process store

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::store::{KeyValueStore, Namespace};
use crate::Result;

/// Volatile [`KeyValueStore`]. Clones share the same maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<Namespace, BTreeMap<String, String>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, namespace: Namespace, key: &str) -> Result<Option<String>> {
        Ok(self
            .data
            .read()
            .get(&namespace)
            .and_then(|map| map.get(key))
            .cloned())
    }

    fn put_string(&self, namespace: Namespace, key: &str, value: &str) -> Result<()> {
        self.data
            .write()
            .entry(namespace)
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, namespace: Namespace, key: &str) -> Result<()> {
        if let Some(map) = self.data.write().get_mut(&namespace) {
            map.remove(key);
        }
        Ok(())
    }

    fn clear_namespace(&self, namespace: Namespace) -> Result<()> {
        self.data.write().remove(&namespace);
        Ok(())
    }

    fn entries(&self, namespace: Namespace) -> Result<Vec<(String, String)>> {
        Ok(self
            .data
            .read()
            .get(&namespace)
            .map(|map| {
                map.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces_are_isolated() {
        let store = MemoryStore::new();
        store
            .put_string(Namespace::Bookmarks, "https://a.org", "A")
            .unwrap();
        store
            .put_string(Namespace::HistoryTitles, "https://a.org", "A visit")
            .unwrap();

        store.clear_namespace(Namespace::HistoryTitles).unwrap();

        assert_eq!(
            store
                .get_string(Namespace::Bookmarks, "https://a.org")
                .unwrap()
                .as_deref(),
            Some("A")
        );
        assert!(store
            .get_string(Namespace::HistoryTitles, "https://a.org")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_get_string_or_default() {
        let store = MemoryStore::new();
        let value = store
            .get_string_or(Namespace::HistoryOrder, "history_order", "")
            .unwrap();
        assert_eq!(value, "");
    }

    #[test]
    fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        other
            .put_string(Namespace::Preferences, "search_provider", "brave")
            .unwrap();
        assert_eq!(
            store.entries(Namespace::Preferences).unwrap(),
            vec![("search_provider".to_string(), "brave".to_string())]
        );
    }
}
