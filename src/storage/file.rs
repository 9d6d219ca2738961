//! JSON-file storage guarded by an advisory lock.
//!
//! All keys live in one JSON object. Each operation takes an exclusive
//! `fs2` lock on a sidecar `.lock` file, so two processes sharing the same
//! data directory never interleave a read-modify-write. Writes go through a
//! temporary file and a rename.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::{KeyValueStore, StorageError};

type Entries = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = path.with_extension("lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_lock<T>(
        &self,
        op: impl FnOnce() -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| self.lock_error(e))?;
        FileExt::lock_exclusive(&lock).map_err(|e| self.lock_error(e))?;

        let result = op();
        if let Err(e) = FileExt::unlock(&lock) {
            tracing::warn!(path = %self.lock_path.display(), error = %e, "Failed to release storage lock");
        }
        result
    }

    fn lock_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Lock {
            path: self.lock_path.clone(),
            source,
        }
    }

    fn read_entries(&self) -> Result<Entries, StorageError> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| StorageError::Read {
            path: self.path.clone(),
            source: e,
        })?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Entries to modify. A corrupt file is replaced rather than blocking writes.
    fn entries_for_update(&self) -> Result<Entries, StorageError> {
        match self.read_entries() {
            Err(StorageError::Corrupt { path, source }) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %source,
                    "Discarding corrupt storage file"
                );
                Ok(Entries::new())
            }
            other => other,
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), StorageError> {
        let write_error = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        let content = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            source: e,
        })?;

        let tmp_path = self.path.with_extension("tmp");
        let mut tmp = File::create(&tmp_path).map_err(write_error)?;
        std::io::Write::write_all(&mut tmp, content.as_bytes()).map_err(write_error)?;
        tmp.sync_all().map_err(write_error)?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path).map_err(write_error)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_lock(|| Ok(self.read_entries()?.get(key).cloned()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_lock(|| {
            let mut entries = self.entries_for_update()?;
            entries.insert(key.to_string(), value.to_string());
            self.write_entries(&entries)
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.with_lock(|| {
            let mut entries = self.entries_for_update()?;
            if entries.remove(key).is_none() {
                return Ok(());
            }
            self.write_entries(&entries)
        })
    }
}
