//! Navigation orchestrator
//!
//! The facade the shell calls. Holds the session manager, the policy, the
//! history ring and the bookmark store, and wires the external launcher's
//! failure path back into an in-session load.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use lynx_navigation::{classify, HistoryEntry, HistoryRing, SearchProvider};
use lynx_privacy::{BlockReason, NavigationPolicy};
use lynx_session::{
    BackOutcome, CompletedLoad, NavigationOutcome, NavigationTarget, SessionId, SessionManager,
    SessionSnapshot, SurfaceEvent, SurfaceFactory,
};
use lynx_storage::{Database, KeyValueStore};

use crate::bookmarks::{Bookmark, Bookmarks};
use crate::config::Config;
use crate::launcher::ExternalLauncher;
use crate::preferences::{Preferences, StoredPreferences};
use crate::Result;

/// What a navigation request turned into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum NavigationResult {
    /// Blank input
    NothingToDo,
    /// `fallback` is set when an app hand-off failed and the URL loads here
    Loading {
        session: SessionId,
        url: String,
        fallback: bool,
    },
    Blocked { url: String, reason: BlockReason },
    DispatchedExternally { app_id: String, url: String },
}

pub struct Navigator {
    sessions: SessionManager,
    policy: RwLock<NavigationPolicy>,
    history: Mutex<HistoryRing>,
    bookmarks: Bookmarks,
    preferences: Arc<dyn Preferences>,
    launcher: Arc<dyn ExternalLauncher>,
    load_start_page: bool,
}

impl Navigator {
    /// Open the on-disk store named by `config` and build a navigator on it.
    pub fn open(
        config: &Config,
        surfaces: Arc<dyn SurfaceFactory>,
        launcher: Arc<dyn ExternalLauncher>,
    ) -> Result<Self> {
        // Ensure data directory exists
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        Self::new(config, Arc::new(db), surfaces, launcher)
    }

    /// Navigator whose search provider preference lives in `store`.
    pub fn new(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        surfaces: Arc<dyn SurfaceFactory>,
        launcher: Arc<dyn ExternalLauncher>,
    ) -> Result<Self> {
        let preferences = Arc::new(StoredPreferences::new(
            Arc::clone(&store),
            config.search_provider,
        ));
        Self::with_preferences(config, store, surfaces, launcher, preferences)
    }

    pub fn with_preferences(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        surfaces: Arc<dyn SurfaceFactory>,
        launcher: Arc<dyn ExternalLauncher>,
        preferences: Arc<dyn Preferences>,
    ) -> Result<Self> {
        let mut policy = NavigationPolicy::from_rules(&config.policy_rules);
        policy.set_tracking_protection(config.tracking_protection);

        let navigator = Self {
            sessions: SessionManager::new(surfaces),
            policy: RwLock::new(policy),
            history: Mutex::new(HistoryRing::load(Arc::clone(&store))),
            bookmarks: Bookmarks::new(store),
            preferences,
            launcher,
            load_start_page: config.load_start_page,
        };

        if navigator.load_start_page {
            let first = navigator.sessions.active_id();
            navigator.load_start_page_into(first)?;
        }

        tracing::info!(
            provider = %navigator.search_provider(),
            tracking_protection = config.tracking_protection,
            "Navigator initialized"
        );

        Ok(navigator)
    }

    // === Navigation ===

    /// Address bar entry, applied to the active session.
    pub fn submit_input(&self, text: &str) -> Result<NavigationResult> {
        let Some(classification) = classify(text) else {
            return Ok(NavigationResult::NothingToDo);
        };

        let url = classification.destination(self.search_provider());
        tracing::debug!(search = classification.is_search(), url = %url, "Resolved input");

        self.navigate(&url, NavigationTarget::Active)
    }

    /// In-page navigation requested by a session's own surface.
    pub fn follow_link(&self, session: SessionId, url: &str) -> Result<NavigationResult> {
        self.navigate(url, NavigationTarget::Session(session))
    }

    /// Navigate in a session opened for this request. No session is opened
    /// when the URL is blocked or handed to an app.
    pub fn open_url_in_new_session(&self, url: &str) -> Result<NavigationResult> {
        self.navigate(url, NavigationTarget::NewSession)
    }

    pub fn open_bookmark(&self, url: &str) -> Result<NavigationResult> {
        self.navigate(url, NavigationTarget::Active)
    }

    fn navigate(&self, url: &str, target: NavigationTarget) -> Result<NavigationResult> {
        let decision = self.policy.read().evaluate(url);

        match self.sessions.apply_navigation(decision, target)? {
            NavigationOutcome::Blocked { reason } => {
                tracing::info!(url = %url, reason = %reason, "Blocked navigation");
                Ok(NavigationResult::Blocked {
                    url: url.to_string(),
                    reason,
                })
            }
            NavigationOutcome::Dispatch { app_id, url } => {
                if self.launcher.try_launch(&app_id, &url) {
                    tracing::info!(app_id = %app_id, url = %url, "Dispatched to external app");
                    return Ok(NavigationResult::DispatchedExternally { app_id, url });
                }

                tracing::info!(app_id = %app_id, url = %url, "External app unavailable, loading in session");

                let session = self.sessions.load(&url, target)?;
                Ok(NavigationResult::Loading {
                    session,
                    url,
                    fallback: true,
                })
            }
            NavigationOutcome::Loading { session, url } => Ok(NavigationResult::Loading {
                session,
                url,
                fallback: false,
            }),
        }
    }

    /// Start pages skip the policy and never hand off to an app.
    fn load_start_page_into(&self, session: SessionId) -> Result<()> {
        let home = self.search_provider().home_url();
        self.sessions
            .load(home, NavigationTarget::Session(session))?;
        Ok(())
    }

    /// Route a surface lifecycle callback. A finished load is recorded in
    /// history and returned.
    pub fn handle_surface_event(&self, event: SurfaceEvent) -> Option<CompletedLoad> {
        let completed = self.sessions.handle_event(event)?;
        self.history
            .lock()
            .record_visit(&completed.url, &completed.title);
        Some(completed)
    }

    // === Sessions ===

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Open a session, loading the start page if configured.
    pub fn open_session(&self) -> Result<SessionId> {
        let id = self.sessions.open_session();
        if self.load_start_page {
            self.load_start_page_into(id)?;
        }
        Ok(id)
    }

    pub fn close_session(&self, id: SessionId) -> Result<SessionId> {
        Ok(self.sessions.close_session(id)?)
    }

    /// Returns the address text of the newly active session.
    pub fn switch_to(&self, id: SessionId) -> Result<String> {
        Ok(self.sessions.switch_to(id)?)
    }

    pub fn active_session(&self) -> SessionSnapshot {
        self.sessions.active()
    }

    pub fn list_sessions(&self) -> Vec<SessionSnapshot> {
        self.sessions.list()
    }

    pub fn go_back(&self) -> Result<bool> {
        Ok(self.sessions.go_back(self.sessions.active_id())?)
    }

    pub fn go_forward(&self) -> Result<bool> {
        Ok(self.sessions.go_forward(self.sessions.active_id())?)
    }

    pub fn reload(&self) -> Result<()> {
        Ok(self.sessions.reload(self.sessions.active_id())?)
    }

    pub fn back_pressed(&self) -> BackOutcome {
        self.sessions.back_pressed()
    }

    // === History ===

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().list().to_vec()
    }

    pub fn search_history(&self, query: &str, limit: usize) -> Vec<HistoryEntry> {
        self.history.lock().search(query, limit)
    }

    pub fn remove_history(&self, url: &str) -> bool {
        self.history.lock().remove_visit(url)
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
        tracing::info!("Cleared history");
    }

    // === Bookmarks ===

    /// Bookmark the active session's page under its display title.
    pub fn bookmark_active_page(&self) -> Result<Bookmark> {
        let active = self.sessions.active();
        self.bookmarks.add(&active.url, &active.title)
    }

    pub fn add_bookmark(&self, url: &str, title: &str) -> Result<Bookmark> {
        self.bookmarks.add(url, title)
    }

    pub fn remove_bookmark(&self, url: &str) -> Result<bool> {
        self.bookmarks.remove(url)
    }

    pub fn bookmark(&self, url: &str) -> Result<Option<Bookmark>> {
        self.bookmarks.get(url)
    }

    pub fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        self.bookmarks.list()
    }

    pub fn clear_bookmarks(&self) -> Result<()> {
        self.bookmarks.clear()
    }

    // === Settings ===

    pub fn search_provider(&self) -> SearchProvider {
        self.preferences.search_provider()
    }

    pub fn set_search_provider(&self, provider: SearchProvider) -> Result<()> {
        self.preferences.set_search_provider(provider)
    }

    pub fn tracking_protection(&self) -> bool {
        self.policy.read().tracking_protection()
    }

    pub fn set_tracking_protection(&self, enabled: bool) {
        self.policy.write().set_tracking_protection(enabled);
        tracing::info!(enabled, "Tracking protection changed");
    }

    /// Release every session. Equivalent to dropping the navigator.
    pub fn shutdown(self) {
        self.sessions.shutdown();
    }
}
