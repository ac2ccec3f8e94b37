//! LibreLynx Sessions
//!
//! A session is one browsing context ("tab") with exactly one rendering
//! surface. The [`SessionManager`] owns the ordered collection:
//! - there is always at least one session
//! - exactly one session is active
//! - closing a session clears and destroys its surface exactly once
//! - lifecycle callbacks from closed sessions are discarded

mod error;
mod manager;
mod session;
mod state;
mod surface;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::SessionError;
pub use manager::{BackOutcome, NavigationOutcome, NavigationTarget, SessionManager};
pub use session::{CompletedLoad, Session, SessionId, SessionSnapshot, NEW_TAB_TITLE};
pub use state::LoadState;
pub use surface::{RenderSurface, SurfaceEvent, SurfaceEventKind, SurfaceFactory};

pub type Result<T> = std::result::Result<T, SessionError>;
