//! Durable key-value store for restart scenarios
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use velha_game::KeyValueStore;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("store file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("store file holds invalid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Key-value store persisted as one JSON object in a single file. Every
/// operation re-reads the file, so two stores opened on the same path observe
/// each other's writes the way two tabs share a browser's storage.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, FileStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes restart from an empty map when the file is unreadable, so a
    /// damaged file heals on the next write instead of wedging the store.
    fn read_entries_for_write(&self) -> BTreeMap<String, String> {
        self.read_entries().unwrap_or_default()
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), FileStoreError> {
        let payload = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, payload)?;
        log::debug!("wrote {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    type Error = FileStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let mut entries = self.read_entries_for_write();
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        let mut entries = self.read_entries_for_write();
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
