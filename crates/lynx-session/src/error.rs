//! Session error types

use thiserror::Error;

use crate::session::SessionId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Cannot close the last session")]
    LastSession,

    #[error("Invalid load state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}
