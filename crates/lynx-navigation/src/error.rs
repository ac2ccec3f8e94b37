//! Navigation error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Unknown search provider: {0}")]
    UnknownProvider(String),

    #[error("Storage error: {0}")]
    Storage(#[from] lynx_storage::StorageError),
}
