//! Session load state machine
//!
//! ```text
//! Idle
//!   ↓ navigate / load started
//! Loading(0)
//!   ↓ progress (never decreases)
//! Loading(p)
//!   ↓ load finished
//! Loaded
//!   ↓ navigate / load started
//! Loading(0) ...
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LoadState {
    /// Never navigated
    #[default]
    Idle,
    /// Surface is fetching; progress is a percentage
    Loading { progress: u8 },
    /// Last load finished
    Loaded,
}

impl LoadState {
    pub const STARTED: LoadState = LoadState::Loading { progress: 0 };

    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: LoadState) -> bool {
        match (self, target) {
            // A new load can start from anywhere, including mid-load
            (_, LoadState::Loading { progress: 0 }) => true,
            // Progress only moves forward within one load
            (LoadState::Loading { progress: from }, LoadState::Loading { progress: to }) => {
                to >= *from && to <= 100
            }
            (LoadState::Loading { .. }, LoadState::Loaded) => true,
            // Same state is always valid (no-op)
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }

    /// Progress bar value: 0 when idle, 100 once loaded.
    pub fn progress(&self) -> u8 {
        match self {
            LoadState::Idle => 0,
            LoadState::Loading { progress } => *progress,
            LoadState::Loaded => 100,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::Loading { .. } => "loading",
            LoadState::Loaded => "loaded",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadState::Loading { progress } => write!(f, "loading({})", progress),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
