//! Search providers

use serde::{Deserialize, Serialize};

use crate::classifier::percent_encode;
use crate::error::NavigationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    Brave,
    #[default]
    Mojeek,
}

impl SearchProvider {
    /// Query prefix; the percent-encoded query is appended verbatim.
    pub fn search_prefix(&self) -> &'static str {
        match self {
            SearchProvider::Brave => "https://search.brave.com/search?q=",
            SearchProvider::Mojeek => "https://www.mojeek.com/search?q=",
        }
    }

    /// Landing page loaded into fresh sessions.
    pub fn home_url(&self) -> &'static str {
        match self {
            SearchProvider::Brave => "https://search.brave.com",
            SearchProvider::Mojeek => "https://www.mojeek.com",
        }
    }

    pub fn search_url(&self, query: &str) -> String {
        format!("{}{}", self.search_prefix(), percent_encode(query))
    }

    /// Lenient lookup used for stored preferences: unknown names map to Brave.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(SearchProvider::Brave)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchProvider::Brave => "brave",
            SearchProvider::Mojeek => "mojeek",
        }
    }
}

impl std::fmt::Display for SearchProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SearchProvider {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "brave" => Ok(SearchProvider::Brave),
            "mojeek" => Ok(SearchProvider::Mojeek),
            _ => Err(NavigationError::UnknownProvider(s.to_string())),
        }
    }
}
