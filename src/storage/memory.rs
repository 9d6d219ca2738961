use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use super::{KeyValueStore, StorageError};

/// Storage operation, used to inject failures into [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOp {
    Get,
    Set,
    Remove,
}

/// In-process storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    failures: Mutex<HashSet<(StorageOp, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `op` on `key` fail with [`StorageError::Unavailable`]
    /// until [`clear_failures`](Self::clear_failures) is called.
    pub fn fail_on(&self, op: StorageOp, key: &str) {
        self.failures.lock().insert((op, key.to_string()));
    }

    pub fn clear_failures(&self) {
        self.failures.lock().clear();
    }

    /// Peek at a value without going through failure injection.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn check(&self, op: StorageOp, key: &str) -> Result<(), StorageError> {
        if self.failures.lock().contains(&(op, key.to_string())) {
            return Err(StorageError::Unavailable {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check(StorageOp::Get, key)?;
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check(StorageOp::Set, key)?;
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check(StorageOp::Remove, key)?;
        self.entries.lock().remove(key);
        Ok(())
    }
}
