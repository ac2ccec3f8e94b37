//! Recording rendering surfaces for tests.
//!
//! Every call a surface receives is appended to a shared [`SurfaceLog`],
//! tagged with the owning session, so tests can assert on call order.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::session::SessionId;
use crate::surface::{RenderSurface, SurfaceFactory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Load(String),
    Reload,
    GoBack,
    GoForward,
    ClearHistory,
    ClearCache,
    ClearFormData,
    Destroy,
}

#[derive(Debug, Clone, Default)]
pub struct SurfaceLog {
    calls: Arc<Mutex<Vec<(SessionId, SurfaceCall)>>>,
}

impl SurfaceLog {
    fn push(&self, session: SessionId, call: SurfaceCall) {
        self.calls.lock().push((session, call));
    }

    pub fn all(&self) -> Vec<(SessionId, SurfaceCall)> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, session: SessionId) -> Vec<SurfaceCall> {
        self.calls
            .lock()
            .iter()
            .filter(|(id, _)| *id == session)
            .map(|(_, call)| call.clone())
            .collect()
    }

    pub fn count(&self, call: &SurfaceCall) -> usize {
        self.calls.lock().iter().filter(|(_, c)| c == call).count()
    }
}

/// In-memory surface with a real back/forward stack.
#[derive(Debug)]
pub struct RecordingSurface {
    session: SessionId,
    log: SurfaceLog,
    current: Option<String>,
    back: Vec<String>,
    forward: Vec<String>,
}

impl RecordingSurface {
    pub fn new(session: SessionId, log: SurfaceLog) -> Self {
        Self {
            session,
            log,
            current: None,
            back: Vec::new(),
            forward: Vec::new(),
        }
    }

    /// Surface with a private log nobody reads.
    pub fn detached(session: SessionId) -> Self {
        Self::new(session, SurfaceLog::default())
    }

    fn record(&self, call: SurfaceCall) {
        self.log.push(self.session, call);
    }
}

impl RenderSurface for RecordingSurface {
    fn load(&mut self, url: &str) {
        self.record(SurfaceCall::Load(url.to_string()));
        if let Some(previous) = self.current.replace(url.to_string()) {
            self.back.push(previous);
        }
        self.forward.clear();
    }

    fn reload(&mut self) {
        self.record(SurfaceCall::Reload);
    }

    fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }

    fn go_back(&mut self) -> bool {
        self.record(SurfaceCall::GoBack);
        match self.back.pop() {
            Some(url) => {
                if let Some(current) = self.current.replace(url) {
                    self.forward.push(current);
                }
                true
            }
            None => false,
        }
    }

    fn go_forward(&mut self) -> bool {
        self.record(SurfaceCall::GoForward);
        match self.forward.pop() {
            Some(url) => {
                if let Some(current) = self.current.replace(url) {
                    self.back.push(current);
                }
                true
            }
            None => false,
        }
    }

    fn clear_history(&mut self) {
        self.record(SurfaceCall::ClearHistory);
        self.back.clear();
        self.forward.clear();
    }

    fn clear_cache(&mut self) {
        self.record(SurfaceCall::ClearCache);
    }

    fn clear_form_data(&mut self) {
        self.record(SurfaceCall::ClearFormData);
    }

    fn destroy(&mut self) {
        self.record(SurfaceCall::Destroy);
        self.current = None;
    }
}

#[derive(Debug, Default)]
pub struct RecordingFactory {
    log: SurfaceLog,
    created: Mutex<Vec<SessionId>>,
}

impl RecordingFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn log(&self) -> &SurfaceLog {
        &self.log
    }

    /// Sessions a surface was created for, in creation order.
    pub fn created(&self) -> Vec<SessionId> {
        self.created.lock().clone()
    }
}

impl SurfaceFactory for RecordingFactory {
    fn create(&self, session: SessionId) -> Box<dyn RenderSurface> {
        self.created.lock().push(session);
        Box::new(RecordingSurface::new(session, self.log.clone()))
    }
}
