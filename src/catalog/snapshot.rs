//! Key-value persistence for catalog snapshots.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::CatalogError;

/// Stores one serialized snapshot per key.
pub trait SnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, CatalogError>;
    fn save(&self, key: &str, contents: &str) -> Result<(), CatalogError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CatalogError>;
}

/// One `<key>.json` file per snapshot under a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> CatalogError {
    CatalogError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, CatalogError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    /// Writes to a temp file then renames, so readers never see half a snapshot.
    fn save(&self, key: &str, contents: &str) -> Result<(), CatalogError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, contents).map_err(|e| io_error(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))
    }

    fn remove(&self, key: &str) -> Result<(), CatalogError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

/// Process-local store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, contents: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), contents.to_string());
        }
        store
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, CatalogError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CatalogError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, contents: &str) -> Result<(), CatalogError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CatalogError::LockPoisoned)?;
        entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CatalogError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CatalogError::LockPoisoned)?;
        entries.remove(key);
        Ok(())
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn load(&self, key: &str) -> Result<Option<String>, CatalogError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, contents: &str) -> Result<(), CatalogError> {
        (**self).save(key, contents)
    }

    fn remove(&self, key: &str) -> Result<(), CatalogError> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        assert_eq!(store.load("absent").unwrap(), None);
    }

    #[test]
    fn test_file_store_save_load_remove() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("nested"));
        store.save("products", "[]").unwrap();
        assert!(dir.path().join("nested/products.json").exists());
        assert_eq!(store.load("products").unwrap().as_deref(), Some("[]"));

        store.remove("products").unwrap();
        assert_eq!(store.load("products").unwrap(), None);
        store.remove("products").unwrap();
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        store.save("k", "one").unwrap();
        store.save("k", "two").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("two"));
        assert!(!dir.path().join(".k.json.tmp").exists());
    }

    #[test]
    fn test_file_store_unreadable_path_is_error() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("k.json")).unwrap();
        let store = FileSnapshotStore::new(dir.path());
        assert!(matches!(store.load("k"), Err(CatalogError::Io { .. })));
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySnapshotStore::with_entry("k", "v");
        assert_eq!(store.load("k").unwrap().as_deref(), Some("v"));
        store.save("k", "w").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("w"));
        store.remove("k").unwrap();
        assert_eq!(store.load("k").unwrap(), None);
    }
}
