//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] lynx_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] lynx_session::SessionError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] lynx_navigation::NavigationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Nothing to bookmark: {0:?}")]
    NothingToBookmark(String),
}
