//! Storage error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Unknown namespace: {0}")]
    UnknownNamespace(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
