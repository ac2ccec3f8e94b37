//! Session Manager
//!
//! Owns the ordered session collection and the active index. The
//! collection lock is held only while mutating; every call into a
//! rendering surface happens after it is released.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use lynx_privacy::{BlockReason, PolicyDecision};

use crate::error::SessionError;
use crate::session::{CompletedLoad, Session, SessionId, SessionSnapshot};
use crate::state::LoadState;
use crate::surface::{self, SurfaceEvent, SurfaceFactory, SurfaceHandle};
use crate::Result;

/// Where an allowed navigation should load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTarget {
    Active,
    Session(SessionId),
    NewSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    Blocked { reason: BlockReason },
    /// Caller launches the app, and loads `url` itself if that fails
    Dispatch { app_id: String, url: String },
    Loading { session: SessionId, url: String },
}

/// Result of the hardware back button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    WentBack,
    ClosedSession(SessionId),
    /// Only one session left and nothing to go back to
    Exit,
}

struct SessionCollection {
    sessions: Vec<Session>,
    active: usize,
}

impl SessionCollection {
    fn index_of(&self, id: SessionId) -> Result<usize> {
        self.sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or(SessionError::NotFound(id))
    }

    fn get_mut(&mut self, id: SessionId) -> Result<&mut Session> {
        let index = self.index_of(id)?;
        Ok(&mut self.sessions[index])
    }

    fn active(&self) -> &Session {
        &self.sessions[self.active]
    }

    fn surface(&self, id: SessionId) -> Result<SurfaceHandle> {
        let index = self.index_of(id)?;
        Ok(Arc::clone(&self.sessions[index].surface))
    }
}

pub struct SessionManager {
    collection: Mutex<SessionCollection>,
    factory: Arc<dyn SurfaceFactory>,
}

impl SessionManager {
    /// Create a manager holding one fresh, active session.
    pub fn new(factory: Arc<dyn SurfaceFactory>) -> Self {
        let id = SessionId::new();
        let first = Session::new(id, factory.create(id));

        tracing::info!(session_id = %id, "Created initial session");

        Self {
            collection: Mutex::new(SessionCollection {
                sessions: vec![first],
                active: 0,
            }),
            factory,
        }
    }

    /// Append a new idle session and make it active.
    pub fn open_session(&self) -> SessionId {
        let id = SessionId::new();
        let session = Session::new(id, self.factory.create(id));

        let mut collection = self.collection.lock();
        collection.sessions.push(session);
        collection.active = collection.sessions.len() - 1;

        tracing::info!(
            session_id = %id,
            count = collection.sessions.len(),
            "Opened session"
        );

        id
    }

    /// Close a session, releasing its surface. Returns the session that is
    /// active afterwards.
    pub fn close_session(&self, id: SessionId) -> Result<SessionId> {
        let (removed, active_id) = {
            let mut collection = self.collection.lock();
            let index = collection.index_of(id)?;
            if collection.sessions.len() == 1 {
                return Err(SessionError::LastSession);
            }

            let removed = collection.sessions.remove(index);
            if index <= collection.active {
                collection.active = collection.active.saturating_sub(1);
            }

            let active = collection.active;
            let current = &mut collection.sessions[active];
            current.touch();
            (removed, current.id)
        };

        surface::release(&removed.surface);

        tracing::info!(session_id = %id, active = %active_id, "Closed session");

        Ok(active_id)
    }

    /// Make `id` active. Returns the text the address field should show.
    pub fn switch_to(&self, id: SessionId) -> Result<String> {
        let mut collection = self.collection.lock();
        let index = collection.index_of(id)?;
        collection.active = index;

        let session = &mut collection.sessions[index];
        session.touch();

        tracing::debug!(session_id = %id, "Switched session");

        Ok(session.address_text().to_string())
    }

    /// Route a policy decision. Only `Allowed` touches a session.
    pub fn apply_navigation(
        &self,
        decision: PolicyDecision,
        target: NavigationTarget,
    ) -> Result<NavigationOutcome> {
        let url = match decision {
            PolicyDecision::Blocked { reason } => {
                return Ok(NavigationOutcome::Blocked { reason });
            }
            PolicyDecision::ExternalDispatch { app_id, url } => {
                return Ok(NavigationOutcome::Dispatch { app_id, url });
            }
            PolicyDecision::Allowed { url } => url,
        };

        let session = self.load(&url, target)?;
        Ok(NavigationOutcome::Loading { session, url })
    }

    /// Load an already-authorized URL in the target session and restart its
    /// load state. Returns the session that is loading.
    pub fn load(&self, url: &str, target: NavigationTarget) -> Result<SessionId> {
        let id = match target {
            NavigationTarget::Active => self.active_id(),
            NavigationTarget::Session(id) => id,
            NavigationTarget::NewSession => self.open_session(),
        };

        let surface = {
            let mut collection = self.collection.lock();
            let session = collection.get_mut(id)?;
            session.transition_to(LoadState::STARTED)?;
            session.current_url = url.to_string();
            Arc::clone(&session.surface)
        };

        surface.lock().load(url);

        tracing::debug!(session_id = %id, url = %url, "Loading in session");

        Ok(id)
    }

    /// Apply a lifecycle callback. Events for sessions that no longer exist
    /// are dropped.
    pub fn handle_event(&self, event: SurfaceEvent) -> Option<CompletedLoad> {
        let mut collection = self.collection.lock();
        match collection.get_mut(event.session) {
            Ok(session) => session.apply(event.kind),
            Err(_) => {
                tracing::debug!(
                    session_id = %event.session,
                    "Discarding event from closed session"
                );
                None
            }
        }
    }

    pub fn go_back(&self, id: SessionId) -> Result<bool> {
        let surface = self.collection.lock().surface(id)?;
        let went = surface.lock().go_back();
        Ok(went)
    }

    pub fn go_forward(&self, id: SessionId) -> Result<bool> {
        let surface = self.collection.lock().surface(id)?;
        let went = surface.lock().go_forward();
        Ok(went)
    }

    pub fn reload(&self, id: SessionId) -> Result<()> {
        let surface = self.collection.lock().surface(id)?;
        surface.lock().reload();
        Ok(())
    }

    /// Hardware back: go back in the active session, else close it, else
    /// tell the shell to exit.
    pub fn back_pressed(&self) -> BackOutcome {
        let (id, surface, count) = {
            let collection = self.collection.lock();
            let active = collection.active();
            (
                active.id,
                Arc::clone(&active.surface),
                collection.sessions.len(),
            )
        };

        {
            let mut surface = surface.lock();
            if surface.can_go_back() && surface.go_back() {
                return BackOutcome::WentBack;
            }
        }

        if count > 1 && self.close_session(id).is_ok() {
            return BackOutcome::ClosedSession(id);
        }

        BackOutcome::Exit
    }

    pub fn active_id(&self) -> SessionId {
        self.collection.lock().active().id
    }

    pub fn active_index(&self) -> usize {
        self.collection.lock().active
    }

    pub fn active(&self) -> SessionSnapshot {
        self.collection.lock().active().snapshot()
    }

    pub fn get(&self, id: SessionId) -> Result<SessionSnapshot> {
        let collection = self.collection.lock();
        let index = collection.index_of(id)?;
        Ok(collection.sessions[index].snapshot())
    }

    /// Snapshots in collection order.
    pub fn list(&self) -> Vec<SessionSnapshot> {
        self.collection
            .lock()
            .sessions
            .iter()
            .map(Session::snapshot)
            .collect()
    }

    pub fn session_count(&self) -> usize {
        self.collection.lock().sessions.len()
    }

    /// Release every surface. Equivalent to dropping the manager.
    pub fn shutdown(self) {
        drop(self);
    }

    fn release_all(&self) {
        let sessions = std::mem::take(&mut self.collection.lock().sessions);
        for session in &sessions {
            surface::release(&session.surface);
        }

        tracing::info!(count = sessions.len(), "Released all sessions");
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let collection = self.collection.lock();
        f.debug_struct("SessionManager")
            .field("sessions", &collection.sessions)
            .field("active", &collection.active)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingFactory, SurfaceCall};
    use proptest::prelude::*;

    fn allowed(url: &str) -> PolicyDecision {
        PolicyDecision::Allowed {
            url: url.to_string(),
        }
    }

    #[test]
    fn test_starts_with_one_active_session() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());

        assert_eq!(manager.session_count(), 1);
        assert_eq!(manager.active_index(), 0);
        assert_eq!(manager.active().load_state, LoadState::Idle);
        assert_eq!(factory.created(), vec![manager.active_id()]);
    }

    #[test]
    fn test_open_then_close_first() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());
        let a = manager.active_id();

        let b = manager.open_session();
        assert_eq!(manager.session_count(), 2);
        assert_eq!(manager.active_id(), b);

        assert_eq!(manager.close_session(a).unwrap(), b);
        assert_eq!(manager.session_count(), 1);
        assert_eq!(manager.active_id(), b);
    }

    #[test]
    fn test_close_last_session_fails() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());
        let only = manager.active_id();

        assert_eq!(manager.close_session(only), Err(SessionError::LastSession));
        assert_eq!(manager.session_count(), 1);
        assert_eq!(manager.active_id(), only);
        assert!(factory.log().calls_for(only).is_empty());
    }

    #[test]
    fn test_unknown_session() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());
        manager.open_session();
        let ghost = SessionId::new();

        assert_eq!(manager.close_session(ghost), Err(SessionError::NotFound(ghost)));
        assert_eq!(manager.switch_to(ghost), Err(SessionError::NotFound(ghost)));
        assert_eq!(manager.session_count(), 2);
    }

    #[test]
    fn test_close_clears_before_destroy() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());
        let a = manager.active_id();
        manager.open_session();

        manager
            .apply_navigation(allowed("https://example.com"), NavigationTarget::Session(a))
            .unwrap();
        manager.close_session(a).unwrap();

        assert_eq!(
            factory.log().calls_for(a),
            vec![
                SurfaceCall::Load("https://example.com".to_string()),
                SurfaceCall::ClearHistory,
                SurfaceCall::ClearCache,
                SurfaceCall::ClearFormData,
                SurfaceCall::Destroy,
            ]
        );
    }

    #[test]
    fn test_close_keeps_active_when_earlier_removed() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());
        let a = manager.active_id();
        let b = manager.open_session();
        let c = manager.open_session();
        manager.switch_to(b).unwrap();

        manager.close_session(a).unwrap();
        assert_eq!(manager.active_id(), b);

        // Closing the active session moves to its left neighbour
        manager.close_session(b).unwrap();
        assert_eq!(manager.active_id(), c);
    }

    #[test]
    fn test_switch_returns_address() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());
        let a = manager.active_id();
        manager
            .apply_navigation(allowed("https://example.com"), NavigationTarget::Active)
            .unwrap();
        manager.open_session();

        assert_eq!(manager.switch_to(a).unwrap(), "https://example.com");
        assert_eq!(manager.active_index(), 0);
    }

    #[test]
    fn test_blocked_and_dispatch_touch_nothing() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());

        let blocked = manager
            .apply_navigation(
                PolicyDecision::Blocked {
                    reason: BlockReason::Tracker {
                        pattern: "doubleclick.net".to_string(),
                    },
                },
                NavigationTarget::NewSession,
            )
            .unwrap();
        assert!(matches!(blocked, NavigationOutcome::Blocked { .. }));

        let dispatch = manager
            .apply_navigation(
                PolicyDecision::ExternalDispatch {
                    app_id: "com.github.android".to_string(),
                    url: "https://github.com".to_string(),
                },
                NavigationTarget::NewSession,
            )
            .unwrap();
        assert_eq!(
            dispatch,
            NavigationOutcome::Dispatch {
                app_id: "com.github.android".to_string(),
                url: "https://github.com".to_string(),
            }
        );

        assert_eq!(manager.session_count(), 1);
        assert_eq!(manager.active().load_state, LoadState::Idle);
        assert!(factory.log().all().is_empty());
    }

    #[test]
    fn test_allowed_into_new_session() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());

        let outcome = manager
            .apply_navigation(allowed("https://example.com"), NavigationTarget::NewSession)
            .unwrap();
        let NavigationOutcome::Loading { session, url } = outcome else {
            panic!("expected loading outcome");
        };

        assert_eq!(url, "https://example.com");
        assert_eq!(manager.session_count(), 2);
        assert_eq!(manager.active_id(), session);
        assert_eq!(manager.active().load_state, LoadState::STARTED);
        assert_eq!(
            factory.log().calls_for(session),
            vec![SurfaceCall::Load("https://example.com".to_string())]
        );
    }

    #[test]
    fn test_load_restarts_loaded_session() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());
        let a = manager.active_id();

        manager.handle_event(SurfaceEvent::started(a, "https://a.example"));
        manager.handle_event(SurfaceEvent::finished(a, "A"));
        assert_eq!(manager.get(a).unwrap().load_state, LoadState::Loaded);

        assert_eq!(manager.load("https://b.example", NavigationTarget::Active), Ok(a));
        let snapshot = manager.get(a).unwrap();
        assert_eq!(snapshot.load_state, LoadState::STARTED);
        assert_eq!(snapshot.url, "https://b.example");
        assert_eq!(
            factory.log().calls_for(a),
            vec![SurfaceCall::Load("https://b.example".to_string())]
        );

        let ghost = SessionId::new();
        assert_eq!(
            manager.load("https://c.example", NavigationTarget::Session(ghost)),
            Err(SessionError::NotFound(ghost))
        );
    }

    #[test]
    fn test_lifecycle_events_route_to_origin() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());
        let a = manager.active_id();
        let b = manager.open_session();

        manager.handle_event(SurfaceEvent::started(a, "https://a.example"));
        manager.handle_event(SurfaceEvent::progress(a, 50));
        let done = manager
            .handle_event(SurfaceEvent::finished(a, "A"))
            .unwrap();

        assert_eq!(done.session, a);
        assert_eq!(done.url, "https://a.example");
        assert_eq!(manager.get(a).unwrap().title, "A");
        assert_eq!(manager.get(b).unwrap().load_state, LoadState::Idle);
    }

    #[test]
    fn test_events_after_close_discarded() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());
        let a = manager.active_id();
        manager.open_session();

        manager
            .apply_navigation(allowed("https://slow.example"), NavigationTarget::Session(a))
            .unwrap();
        manager.close_session(a).unwrap();

        assert!(manager.handle_event(SurfaceEvent::progress(a, 90)).is_none());
        assert!(manager
            .handle_event(SurfaceEvent::finished(a, "Slow"))
            .is_none());
        assert_eq!(manager.session_count(), 1);
    }

    #[test]
    fn test_back_pressed() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());
        let a = manager.active_id();

        manager
            .apply_navigation(allowed("https://one.example"), NavigationTarget::Active)
            .unwrap();
        manager
            .apply_navigation(allowed("https://two.example"), NavigationTarget::Active)
            .unwrap();
        assert_eq!(manager.back_pressed(), BackOutcome::WentBack);

        let b = manager.open_session();
        assert_eq!(manager.back_pressed(), BackOutcome::ClosedSession(b));
        assert_eq!(manager.active_id(), a);

        // Back stack of `a` is exhausted after the first WentBack
        assert_eq!(manager.back_pressed(), BackOutcome::Exit);
        assert_eq!(manager.session_count(), 1);
    }

    #[test]
    fn test_shutdown_releases_each_surface_once() {
        let factory = RecordingFactory::new();
        let manager = SessionManager::new(factory.clone());
        manager.open_session();
        manager.open_session();

        manager.shutdown();

        assert_eq!(factory.log().count(&SurfaceCall::Destroy), 3);
        assert_eq!(factory.log().count(&SurfaceCall::ClearFormData), 3);
    }

    #[test]
    fn test_drop_releases_surfaces() {
        let factory = RecordingFactory::new();
        {
            let manager = SessionManager::new(factory.clone());
            let a = manager.active_id();
            manager.open_session();
            manager.close_session(a).unwrap();
        }

        // One from close, one from drop
        assert_eq!(factory.log().count(&SurfaceCall::Destroy), 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Open,
        Close(usize),
        Switch(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Open),
            (0usize..8).prop_map(Op::Close),
            (0usize..8).prop_map(Op::Switch),
        ]
    }

    proptest! {
        #[test]
        fn prop_collection_invariants(ops in prop::collection::vec(op(), 1..40)) {
            let factory = RecordingFactory::new();
            let manager = SessionManager::new(factory.clone());

            for op in ops {
                let ids: Vec<SessionId> = manager.list().iter().map(|s| s.id).collect();
                match op {
                    Op::Open => {
                        let id = manager.open_session();
                        prop_assert_eq!(manager.active_id(), id);
                    }
                    Op::Close(i) => {
                        let id = ids[i % ids.len()];
                        let result = manager.close_session(id);
                        if ids.len() == 1 {
                            prop_assert_eq!(result, Err(SessionError::LastSession));
                        } else {
                            prop_assert!(result.is_ok());
                            prop_assert_eq!(manager.session_count(), ids.len() - 1);
                        }
                    }
                    Op::Switch(i) => {
                        let id = ids[i % ids.len()];
                        manager.switch_to(id).unwrap();
                        prop_assert_eq!(manager.active_id(), id);
                    }
                }

                prop_assert!(manager.session_count() >= 1);
                prop_assert!(manager.active_index() < manager.session_count());
            }

            // Every closed session was destroyed exactly once
            let live = manager.session_count();
            let created = factory.created().len();
            prop_assert_eq!(factory.log().count(&SurfaceCall::Destroy), created - live);
        }
    }
}
