//! Live user preferences
//!
//! The navigator reads the search provider through [`Preferences`] on every
//! request, so a change made in settings applies to the next search.

use parking_lot::RwLock;
use std::sync::Arc;

use lynx_navigation::SearchProvider;
use lynx_storage::{KeyValueStore, Namespace};

use crate::Result;

pub const SEARCH_PROVIDER_KEY: &str = "search_provider";

pub trait Preferences: Send + Sync {
    fn search_provider(&self) -> SearchProvider;

    fn set_search_provider(&self, provider: SearchProvider) -> Result<()>;
}

/// Fixed in memory; nothing is persisted.
#[derive(Debug, Default)]
pub struct StaticPreferences {
    provider: RwLock<SearchProvider>,
}

impl StaticPreferences {
    pub fn new(provider: SearchProvider) -> Self {
        Self {
            provider: RwLock::new(provider),
        }
    }
}

impl Preferences for StaticPreferences {
    fn search_provider(&self) -> SearchProvider {
        *self.provider.read()
    }

    fn set_search_provider(&self, provider: SearchProvider) -> Result<()> {
        *self.provider.write() = provider;
        Ok(())
    }
}

/// Backed by the store's preferences namespace, cached after the first read.
pub struct StoredPreferences {
    store: Arc<dyn KeyValueStore>,
    provider: RwLock<SearchProvider>,
}

impl StoredPreferences {
    /// `fallback` applies when nothing has been stored yet or the store
    /// can't be read. Stored names that don't parse map to Brave.
    pub fn new(store: Arc<dyn KeyValueStore>, fallback: SearchProvider) -> Self {
        let provider = match store.get_string(Namespace::Preferences, SEARCH_PROVIDER_KEY) {
            Ok(Some(name)) => SearchProvider::from_name(&name),
            Ok(None) => fallback,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read search provider preference");
                fallback
            }
        };

        Self {
            store,
            provider: RwLock::new(provider),
        }
    }
}

impl Preferences for StoredPreferences {
    fn search_provider(&self) -> SearchProvider {
        *self.provider.read()
    }

    fn set_search_provider(&self, provider: SearchProvider) -> Result<()> {
        self.store
            .put_string(Namespace::Preferences, SEARCH_PROVIDER_KEY, provider.as_str())?;
        *self.provider.write() = provider;

        tracing::info!(provider = %provider, "Search provider changed");

        Ok(())
    }
}

impl std::fmt::Debug for StoredPreferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredPreferences")
            .field("provider", &*self.provider.read())
            .finish_non_exhaustive()
    }
}
