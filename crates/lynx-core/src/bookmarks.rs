//! Bookmarks
//!
//! Stored in the bookmarks namespace as `url -> title`. The store keeps no
//! order; listings are sorted by title, then URL.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use lynx_navigation::BLANK_PAGE;
use lynx_storage::{KeyValueStore, Namespace};

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub title: String,
    pub url: String,
}

impl Bookmark {
    /// An empty title is replaced by the URL.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        let url = url.into();
        let title = title.into();
        let title = if title.trim().is_empty() {
            url.clone()
        } else {
            title
        };
        Self { title, url }
    }
}

pub struct Bookmarks {
    store: Arc<dyn KeyValueStore>,
}

impl Bookmarks {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Add or retitle a bookmark. Blank pages can't be bookmarked.
    pub fn add(&self, url: &str, title: &str) -> Result<Bookmark> {
        let url = url.trim();
        if url.is_empty() || url == BLANK_PAGE {
            return Err(CoreError::NothingToBookmark(url.to_string()));
        }

        let bookmark = Bookmark::new(url, title);
        self.store
            .put_string(Namespace::Bookmarks, &bookmark.url, &bookmark.title)?;

        tracing::info!(url = %bookmark.url, "Added bookmark");

        Ok(bookmark)
    }

    /// Returns whether a bookmark was removed.
    pub fn remove(&self, url: &str) -> Result<bool> {
        if self.get(url)?.is_none() {
            return Ok(false);
        }

        self.store.remove(Namespace::Bookmarks, url)?;

        tracing::info!(url = %url, "Removed bookmark");

        Ok(true)
    }

    pub fn get(&self, url: &str) -> Result<Option<Bookmark>> {
        Ok(self
            .store
            .get_string(Namespace::Bookmarks, url)?
            .map(|title| Bookmark::new(url, title)))
    }

    pub fn list(&self) -> Result<Vec<Bookmark>> {
        let mut items: Vec<Bookmark> = self
            .store
            .entries(Namespace::Bookmarks)?
            .into_iter()
            .map(|(url, title)| Bookmark::new(url, title))
            .collect();

        items.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.url.cmp(&b.url)));
        Ok(items)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear_namespace(Namespace::Bookmarks)?;
        tracing::info!("Cleared bookmarks");
        Ok(())
    }
}
