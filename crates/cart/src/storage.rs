//! Durable key-value storage for the serialized cart.
//!
//! The cart keeps one text value under a fixed key, overwritten wholesale on
//! every commit. [`FileStorage`] keeps each key in its own file so the cart
//! survives a restart; [`MemoryStorage`] keeps values in process.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// Errors that can occur when reading or writing durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backend cannot be used right now.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A key-value slot holding text values.
pub trait DurableStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend could not be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Stores each key as a JSON file inside a directory.
///
/// File names are the percent-encoded key, so `@RocketShoes:cart` becomes
/// `%40RocketShoes%3Acart.json`. Writes go to a temporary file that is then
/// renamed over the target, so a reader never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `dir`. The directory is created on
    /// first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the stored values.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl DurableStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        let write_tmp = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()
        };
        write_tmp().map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;

        fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path, source })
    }
}

/// Keeps values in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory storage pre-populated with one value.
    #[must_use]
    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let items = HashMap::from([(key.into(), value.into())]);
        Self {
            items: Mutex::new(items),
        }
    }
}

impl DurableStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self
            .items
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get_item("@RocketShoes:cart").unwrap(), None);
    }

    #[test]
    fn test_file_storage_overwrites_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.set_item("@RocketShoes:cart", "[1]").unwrap();
        storage.set_item("@RocketShoes:cart", "[]").unwrap();

        assert_eq!(
            storage.get_item("@RocketShoes:cart").unwrap().as_deref(),
            Some("[]")
        );
        assert!(!storage.path_for("@RocketShoes:cart").with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_storage_encodes_key() {
        let storage = FileStorage::new("/var/cart");
        assert_eq!(
            storage.path_for("@RocketShoes:cart"),
            PathBuf::from("/var/cart/%40RocketShoes%3Acart.json")
        );
        assert_eq!(
            storage.path_for("../escape"),
            PathBuf::from("/var/cart/..%2Fescape.json")
        );
    }

    #[test]
    fn test_file_storage_unwritable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let storage = FileStorage::new(blocker.join("cart"));
        let err = storage.set_item("key", "value").unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::with_item("a", "1");
        assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.get_item("b").unwrap(), None);

        storage.set_item("b", "2").unwrap();
        assert_eq!(storage.get_item("b").unwrap().as_deref(), Some("2"));
    }
}
