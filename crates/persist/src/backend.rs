//! Durable key-value media for persisted snapshots.
//!
//! Layout of a filesystem store:
//! ```text
//! <root>/
//!   <snapshot-id>.json   - one pretty-printed snapshot per file
//! ```

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use worldforge_common::SnapshotId;

use crate::error::StoreError;

const EXTENSION: &str = "json";

/// Key-value medium keyed by snapshot id.
///
/// `put` is write-once: writing an id that already exists fails with
/// [`StoreError::AlreadyExists`]. Keys that are not storage safe are never
/// present.
pub trait StorageBackend {
    fn put(&mut self, id: &SnapshotId, bytes: &[u8]) -> Result<(), StoreError>;
    fn get(&self, id: &SnapshotId) -> Result<Option<Vec<u8>>, StoreError>;
    fn keys(&self) -> Result<Vec<SnapshotId>, StoreError>;
    /// Delete an entry. Only operator housekeeping calls this.
    fn remove(&mut self, id: &SnapshotId) -> Result<bool, StoreError>;
}

/// One JSON file per snapshot inside a directory.
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    /// Open or create a snapshot directory at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Get the path to the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds (or would hold) the given snapshot.
    pub fn path_for(&self, id: &SnapshotId) -> PathBuf {
        self.root.join(format!("{id}.{EXTENSION}"))
    }
}

impl StorageBackend for FsBackend {
    fn put(&mut self, id: &SnapshotId, bytes: &[u8]) -> Result<(), StoreError> {
        if !id.is_storage_safe() {
            return Err(StoreError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("snapshot id {id:?} is not a valid storage key"),
            )));
        }
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path_for(id))
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(id.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(())
    }

    fn get(&self, id: &SnapshotId) -> Result<Option<Vec<u8>>, StoreError> {
        if !id.is_storage_safe() {
            return Ok(None);
        }
        match fs::read(self.path_for(id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<SnapshotId>, StoreError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(SnapshotId::from(stem));
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn remove(&mut self, id: &SnapshotId) -> Result<bool, StoreError> {
        if !id.is_storage_safe() {
            return Ok(false);
        }
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory backend for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: BTreeMap<SnapshotId, Vec<u8>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the stored bytes of an entry in place, as a corrupt or partial
    /// write would.
    #[cfg(test)]
    pub(crate) fn overwrite_raw(&mut self, id: &SnapshotId, bytes: Vec<u8>) {
        self.entries.insert(id.clone(), bytes);
    }
}

impl StorageBackend for MemoryBackend {
    fn put(&mut self, id: &SnapshotId, bytes: &[u8]) -> Result<(), StoreError> {
        if self.entries.contains_key(id) {
            return Err(StoreError::AlreadyExists(id.clone()));
        }
        self.entries.insert(id.clone(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, id: &SnapshotId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(id).cloned())
    }

    fn keys(&self) -> Result<Vec<SnapshotId>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn remove(&mut self, id: &SnapshotId) -> Result<bool, StoreError> {
        Ok(self.entries.remove(id).is_some())
    }
}
