//! LibreLynx Navigation
//!
//! Address bar input resolution:
//!   1. No whitespace and URL-shaped → navigate (https:// added if missing)
//!   2. Anything else → search with the configured provider
//!   3. Blank → nothing to do
//!
//! Plus the bounded, deduplicated history ring that records completed loads.

mod classifier;
mod error;
mod history;
mod provider;

pub use classifier::{classify, percent_encode, Classification, BLANK_PAGE};
pub use error::NavigationError;
pub use history::{HistoryEntry, HistoryRing, HISTORY_CAPACITY, HISTORY_ORDER_KEY};
pub use provider::SearchProvider;

pub type Result<T> = std::result::Result<T, NavigationError>;
