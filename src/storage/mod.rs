//! Durable key-value storage for the session.
//!
//! The session store only needs string get/set/remove, so that is all the
//! trait offers. [`FileStore`] is the on-disk implementation used by the
//! application; [`MemoryStore`] backs tests and can inject failures.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::{MemoryStore, StorageOp};

use std::path::PathBuf;
use thiserror::Error;

/// Fixed storage keys.
pub mod keys {
    /// Bearer token, as written by the session store.
    pub const USER_TOKEN: &str = "userToken";
    /// Bearer token, as read by the REST client in older builds.
    pub const AUTH_TOKEN: &str = "authToken";
    /// JSON-serialized [`UserRecord`](crate::domain::UserRecord).
    pub const USER_DATA: &str = "userData";

    /// Every key that belongs to a session, in removal order.
    pub const SESSION_KEYS: [&str; 3] = [USER_TOKEN, AUTH_TOKEN, USER_DATA];
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read storage file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write storage file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to lock storage file '{path}': {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage file '{path}' is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage unavailable for key '{key}'")]
    Unavailable { key: String },
}

/// String key-value storage that survives process restarts.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
