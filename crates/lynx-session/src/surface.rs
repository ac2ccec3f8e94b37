//! Rendering surface seam
//!
//! The platform web view lives behind [`RenderSurface`]. Each session owns
//! one surface from creation until close; the manager never calls into a
//! surface while holding the collection lock.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::session::SessionId;

pub trait RenderSurface: Send {
    fn load(&mut self, url: &str);

    fn reload(&mut self);

    fn can_go_back(&self) -> bool;

    /// Returns false when there is nothing to go back to.
    fn go_back(&mut self) -> bool;

    /// Returns false when there is nothing to go forward to.
    fn go_forward(&mut self) -> bool;

    fn clear_history(&mut self);

    fn clear_cache(&mut self);

    fn clear_form_data(&mut self);

    /// Free the surface. Called once, after the clear calls.
    fn destroy(&mut self);
}

/// Creates the surface for a newly opened session. Implementations tag the
/// surface's callbacks with `session` so stale events can be told apart.
pub trait SurfaceFactory: Send + Sync {
    fn create(&self, session: SessionId) -> Box<dyn RenderSurface>;
}

pub(crate) type SurfaceHandle = Arc<Mutex<Box<dyn RenderSurface>>>;

/// Wipe stored history, cache and form data, then destroy.
pub(crate) fn release(surface: &SurfaceHandle) {
    let mut surface = surface.lock();
    surface.clear_history();
    surface.clear_cache();
    surface.clear_form_data();
    surface.destroy();
}

/// Lifecycle callback from a session's surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceEvent {
    pub session: SessionId,
    pub kind: SurfaceEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceEventKind {
    LoadStarted { url: String },
    Progress { percent: u8 },
    /// `url` is the final URL after redirects, when the surface reports it
    LoadFinished { url: Option<String>, title: String },
}

impl SurfaceEvent {
    pub fn started(session: SessionId, url: impl Into<String>) -> Self {
        Self {
            session,
            kind: SurfaceEventKind::LoadStarted { url: url.into() },
        }
    }

    pub fn progress(session: SessionId, percent: u8) -> Self {
        Self {
            session,
            kind: SurfaceEventKind::Progress { percent },
        }
    }

    pub fn finished(session: SessionId, title: impl Into<String>) -> Self {
        Self {
            session,
            kind: SurfaceEventKind::LoadFinished {
                url: None,
                title: title.into(),
            },
        }
    }

    pub fn finished_at(session: SessionId, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            session,
            kind: SurfaceEventKind::LoadFinished {
                url: Some(url.into()),
                title: title.into(),
            },
        }
    }
}
