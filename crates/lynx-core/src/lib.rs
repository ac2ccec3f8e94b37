//! LibreLynx Core
//!
//! The [`Navigator`] is the surface the shell talks to. Every request flows
//! classifier → policy → session manager, and completed loads flow back
//! into the history ring.

mod bookmarks;
mod config;
mod error;
mod launcher;
mod navigator;
mod preferences;

pub use bookmarks::{Bookmark, Bookmarks};
pub use config::Config;
pub use error::CoreError;
pub use launcher::{ExternalLauncher, NoopLauncher};
pub use navigator::{NavigationResult, Navigator};
pub use preferences::{Preferences, StaticPreferences, StoredPreferences, SEARCH_PROVIDER_KEY};

// Re-export core components
pub use lynx_navigation::{
    classify, Classification, HistoryEntry, HistoryRing, NavigationError, SearchProvider,
    BLANK_PAGE,
};
pub use lynx_privacy::{BlockReason, NavigationPolicy, PolicyDecision, PolicyRules};
pub use lynx_session::{
    BackOutcome, CompletedLoad, LoadState, RenderSurface, SessionError, SessionId,
    SessionManager, SessionSnapshot, SurfaceEvent, SurfaceEventKind, SurfaceFactory,
};
pub use lynx_storage::{Database, KeyValueStore, MemoryStore, Namespace, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
