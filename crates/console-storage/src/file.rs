//! File-backed session storage.
//!
//! All console processes for one OS user share a single JSON document on
//! disk. Every mutation stamps the writing process's instance id into the
//! document so a watcher in another process can tell foreign writes from
//! its own (the same way browser storage events only fire in *other* tabs).

use crate::{SessionStorage, StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

/// On-disk shape of the shared store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreDocument {
    /// Instance id of the process that performed the last mutation.
    #[serde(default)]
    pub writer: Option<String>,
    /// Key/value entries.
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

impl StoreDocument {
    /// Read the document at `path`.
    ///
    /// A missing or unparseable file reads as `None`; corruption is
    /// logged and treated as an empty store, never surfaced as an error.
    pub fn read(path: &Path) -> Option<StoreDocument> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(doc) => Some(doc),
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "Store document is malformed");
                None
            }
        }
    }
}

/// File-backed storage implementation.
pub struct FileStorage {
    path: PathBuf,
    instance_id: String,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Create a storage instance backed by the document at `path`.
    ///
    /// The parent directory is created if needed. The file itself is only
    /// created on first write.
    pub fn new(path: PathBuf) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            instance_id: Uuid::new_v4().to_string(),
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// This process's writer id, stamped into the document on every mutation.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn read_document(&self) -> StoreDocument {
        StoreDocument::read(&self.path).unwrap_or_default()
    }

    /// Write the document via a temp file and rename so readers in other
    /// processes never observe a half-written store.
    fn write_document(&self, doc: &StoreDocument) -> StorageResult<()> {
        let content = serde_json::to_string_pretty(doc)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().expect("lock poisoned");
        let mut doc = self.read_document();
        doc.entries.insert(key.to_string(), value.to_string());
        doc.writer = Some(self.instance_id.clone());
        self.write_document(&doc)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_document().entries.get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let _guard = self.write_lock.lock().expect("lock poisoned");
        let mut doc = self.read_document();
        let removed = doc.entries.remove(key).is_some();
        if removed {
            doc.writer = Some(self.instance_id.clone());
            self.write_document(&doc)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_at(dir: &tempfile::TempDir) -> FileStorage {
        FileStorage::new(dir.path().join("session.json")).unwrap()
    }

    #[test]
    fn test_set_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(&dir);

        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));
        assert!(storage.has("k").unwrap());

        assert!(storage.delete("k").unwrap());
        assert!(!storage.delete("k").unwrap());
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_visible_to_second_instance() {
        let dir = tempfile::tempdir().unwrap();
        let first = storage_at(&dir);
        let second = storage_at(&dir);

        first.set("k", "v").unwrap();
        assert_eq!(second.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_mutations_stamp_writer_id() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(&dir);

        storage.set("k", "v").unwrap();
        let doc = StoreDocument::read(storage.path()).unwrap();
        assert_eq!(doc.writer.as_deref(), Some(storage.instance_id()));

        let other = storage_at(&dir);
        other.delete("k").unwrap();
        let doc = StoreDocument::read(storage.path()).unwrap();
        assert_eq!(doc.writer.as_deref(), Some(other.instance_id()));
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(&dir);
        assert_eq!(storage.get("k").unwrap(), None);
        assert!(StoreDocument::read(storage.path()).is_none());
    }

    #[test]
    fn test_corrupt_file_reads_empty_and_recovers_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(&dir);
        std::fs::write(storage.path(), "{not json").unwrap();

        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));
    }
}
