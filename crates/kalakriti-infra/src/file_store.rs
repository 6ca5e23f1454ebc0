//! JSON-file-backed `KeyValueStore`.
//!
//! All keys live in one JSON object. Writes go to a temporary file in the
//! same directory which is then renamed over the target, so a crash never
//! leaves a half-written file behind.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use kalakriti_core::error::DomainError;
use kalakriti_core::storage::KeyValueStore;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

type Entries = BTreeMap<String, String>;

#[derive(Debug, Error)]
enum StoreFileError {
    #[error("failed to read store file: {0}")]
    Read(std::io::Error),
    #[error("corrupt store file: {0}")]
    Corrupt(serde_json::Error),
    #[error("failed to encode store: {0}")]
    Encode(serde_json::Error),
    #[error("failed to write store file: {0}")]
    Write(std::io::Error),
}

/// A durable key-value store kept in a single JSON file.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Opens the store at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn domain_error(&self, error: &StoreFileError) -> DomainError {
        DomainError::Infrastructure(format!("{}: {error}", self.path.display()))
    }

    fn read_entries(&self) -> Result<Entries, StoreFileError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(StoreFileError::Read(e)),
        };
        serde_json::from_str(&raw).map_err(StoreFileError::Corrupt)
    }

    /// Entries to write over; a corrupt file is replaced rather than
    /// blocking every future write.
    fn entries_for_update(&self) -> Result<Entries, StoreFileError> {
        match self.read_entries() {
            Err(StoreFileError::Corrupt(e)) => {
                warn!(path = %self.path.display(), error = %e, "replacing corrupt store file");
                Ok(Entries::new())
            }
            other => other,
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), StoreFileError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let json = serde_json::to_string_pretty(entries).map_err(StoreFileError::Encode)?;

        let mut file = NamedTempFile::new_in(dir).map_err(StoreFileError::Write)?;
        file.write_all(json.as_bytes()).map_err(StoreFileError::Write)?;
        file.as_file().sync_all().map_err(StoreFileError::Write)?;
        file.persist(&self.path)
            .map_err(|e| StoreFileError::Write(e.error))?;
        debug!(path = %self.path.display(), keys = entries.len(), "store file written");
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.read_entries().map_err(|e| self.domain_error(&e))?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.entries_for_update().map_err(|e| self.domain_error(&e))?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write_entries(&entries)
            .map_err(|e| self.domain_error(&e))
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.entries_for_update().map_err(|e| self.domain_error(&e))?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)
            .map_err(|e| self.domain_error(&e))
    }
}
