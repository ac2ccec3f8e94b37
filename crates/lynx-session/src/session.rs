//! Session data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use lynx_navigation::BLANK_PAGE;
use parking_lot::Mutex;

use crate::error::SessionError;
use crate::state::LoadState;
use crate::surface::{RenderSurface, SurfaceEventKind, SurfaceHandle};
use crate::Result;

/// Placeholder shown for sessions without a meaningful title or URL
pub const NEW_TAB_TITLE: &str = "New Tab";

/// Process-local session identity. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A load that finished with a URL worth remembering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedLoad {
    pub session: SessionId,
    pub url: String,
    pub title: String,
}

pub struct Session {
    /// Unique identifier
    pub id: SessionId,
    /// Last title reported by the surface
    pub title: String,
    /// Last committed URL, empty if never navigated
    pub current_url: String,
    pub load_state: LoadState,
    pub created_at: DateTime<Utc>,
    /// Last time the session was made active
    pub last_accessed_at: DateTime<Utc>,
    pub(crate) surface: SurfaceHandle,
}

impl Session {
    pub(crate) fn new(id: SessionId, surface: Box<dyn RenderSurface>) -> Self {
        let now = Utc::now();

        Self {
            id,
            title: String::new(),
            current_url: String::new(),
            load_state: LoadState::Idle,
            created_at: now,
            last_accessed_at: now,
            surface: Arc::new(Mutex::new(surface)),
        }
    }

    /// Attempt to transition to a new load state
    pub fn transition_to(&mut self, new_state: LoadState) -> Result<()> {
        if !self.load_state.can_transition_to(new_state) {
            return Err(SessionError::InvalidTransition {
                from: self.load_state.to_string(),
                to: new_state.to_string(),
            });
        }

        tracing::debug!(
            session_id = %self.id,
            from = %self.load_state,
            to = %new_state,
            "Session load state transition"
        );

        self.load_state = new_state;
        Ok(())
    }

    pub(crate) fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }

    /// Apply a lifecycle callback from this session's own surface.
    ///
    /// Returns the completed load when the event finishes a load of a real
    /// URL. Out-of-order events are ignored.
    pub(crate) fn apply(&mut self, event: SurfaceEventKind) -> Option<CompletedLoad> {
        match event {
            SurfaceEventKind::LoadStarted { url } => {
                self.transition_to(LoadState::STARTED).ok()?;
                self.current_url = url;
                None
            }
            SurfaceEventKind::Progress { percent } => {
                // Only a load start may reset progress; updates move forward within a load
                let progress = percent.min(100);
                match self.load_state {
                    LoadState::Loading { progress: current } if progress >= current => {
                        self.load_state = LoadState::Loading { progress };
                    }
                    state => {
                        tracing::debug!(
                            session_id = %self.id,
                            state = %state,
                            progress,
                            "Ignoring progress update"
                        );
                    }
                }
                None
            }
            SurfaceEventKind::LoadFinished { url, title } => {
                if let Err(e) = self.transition_to(LoadState::Loaded) {
                    tracing::debug!(session_id = %self.id, error = %e, "Ignoring load finished");
                    return None;
                }

                if let Some(url) = url {
                    self.current_url = url;
                }
                self.title = title;

                if self.current_url.is_empty() || self.current_url == BLANK_PAGE {
                    return None;
                }

                Some(CompletedLoad {
                    session: self.id,
                    url: self.current_url.clone(),
                    title: self.title.clone(),
                })
            }
        }
    }

    /// Title for tab lists: page title, else URL, else placeholder.
    pub fn display_title(&self) -> &str {
        if !self.title.is_empty() && self.title != BLANK_PAGE {
            &self.title
        } else if !self.address_text().is_empty() {
            &self.current_url
        } else {
            NEW_TAB_TITLE
        }
    }

    /// What the address field should show for this session.
    pub fn address_text(&self) -> &str {
        if self.current_url == BLANK_PAGE {
            ""
        } else {
            &self.current_url
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            title: self.display_title().to_string(),
            url: self.current_url.clone(),
            load_state: self.load_state,
            created_at: self.created_at,
            last_accessed_at: self.last_accessed_at,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("current_url", &self.current_url)
            .field("load_state", &self.load_state)
            .finish_non_exhaustive()
    }
}

/// Read-only copy of a session handed to UI callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    /// Display title (placeholder already applied)
    pub title: String,
    pub url: String,
    pub load_state: LoadState,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}
