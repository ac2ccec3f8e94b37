//! LibreLynx Storage Layer
//!
//! A small namespaced key-value store. The browser core only ever sees the
//! [`KeyValueStore`] trait; [`Database`] backs it with SQLite on disk and
//! [`MemoryStore`] keeps everything in process.

mod database;
mod error;
mod memory;
mod migrations;
mod store;

pub use database::Database;
pub use error::StorageError;
pub use memory::MemoryStore;
pub use store::{KeyValueStore, Namespace};

pub type Result<T> = std::result::Result<T, StorageError>;
