//! Blob storage for originals and derived images.
//!
//! The ingestion pipeline never touches the filesystem directly: originals,
//! thumbnails and previews each live in a [`BlobStore`] addressed by flat
//! filename keys. [`FsBlobStore`] backs a store with a directory;
//! [`MemoryBlobStore`] keeps everything in memory for tests.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::config::Config;
use crate::error::StoreError;

/// Put/get/delete of byte blobs by flat key.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any existing blob.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Read the blob stored under `key`.
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Remove the blob under `key`. Missing blobs are `StoreError::NotFound`.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Whether a blob exists under `key`.
    fn contains(&self, key: &str) -> bool;
}

/// Keys are single path components; anything that could escape the store
/// is refused.
fn check_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\', '\0']) {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Write `bytes` to a uniquely named sibling temp file, then rename it over
/// `path`.
///
/// Readers see either the old contents or the new ones, never a torn write.
/// Concurrent writers to the same path each get their own temp file; the
/// last rename wins.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".photolog-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// A blob store backed by one directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem path for `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        check_key(key)?;
        Ok(self.root.join(key))
    }

    fn io_error(path: PathBuf, source: std::io::Error) -> StoreError {
        StoreError::Io { path, source }
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root).map_err(|e| Self::io_error(self.root.clone(), e))?;
        write_atomic(&path, bytes).map_err(|e| Self::io_error(path, e))
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            _ => Self::io_error(path, e),
        })
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::remove_file(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            _ => Self::io_error(path, e),
        })
    }

    fn contains(&self, key: &str) -> bool {
        self.path_for(key).map(|p| p.is_file()).unwrap_or(false)
    }
}

/// An in-memory blob store.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        check_key(key)?;
        let mut blobs = self.blobs.write().unwrap_or_else(|e| e.into_inner());
        blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        check_key(key)?;
        let blobs = self.blobs.read().unwrap_or_else(|e| e.into_inner());
        blobs
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        let mut blobs = self.blobs.write().unwrap_or_else(|e| e.into_inner());
        blobs
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn contains(&self, key: &str) -> bool {
        let blobs = self.blobs.read().unwrap_or_else(|e| e.into_inner());
        blobs.contains_key(key)
    }
}

/// The three logical stores of a journal.
#[derive(Clone)]
pub struct Stores {
    /// Uploaded bytes, keyed by `stored_filename`
    pub originals: Arc<dyn BlobStore>,

    /// Thumbnail tier, keyed by `thumb_{stored_filename}`
    pub thumbnails: Arc<dyn BlobStore>,

    /// Preview tier, keyed by `preview_{stored_filename}`
    pub previews: Arc<dyn BlobStore>,
}

impl Stores {
    /// Directory-backed stores at the configured locations.
    pub fn on_disk(config: &Config) -> Self {
        Self {
            originals: Arc::new(FsBlobStore::new(config.originals_dir())),
            thumbnails: Arc::new(FsBlobStore::new(config.thumbnails_dir())),
            previews: Arc::new(FsBlobStore::new(config.previews_dir())),
        }
    }

    /// Fresh, empty in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            originals: Arc::new(MemoryBlobStore::new()),
            thumbnails: Arc::new(MemoryBlobStore::new()),
            previews: Arc::new(MemoryBlobStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_store_roundtrip_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().join("uploads"));

        store.put("a.jpg", b"jpeg bytes").unwrap();
        assert!(store.contains("a.jpg"));
        assert_eq!(store.get("a.jpg").unwrap(), b"jpeg bytes");

        store.delete("a.jpg").unwrap();
        assert!(!store.contains("a.jpg"));
        assert!(matches!(store.delete("a.jpg"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.get("a.jpg"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_fs_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        store.put("a.png", b"one").unwrap();
        store.put("a.png", b"two").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png".to_string()]);
        assert_eq!(store.get("a.png").unwrap(), b"two");
    }

    #[test]
    fn test_fs_store_concurrent_writes_to_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let payloads: Vec<Vec<u8>> = (0..4u8).map(|i| vec![i; 256 * 1024]).collect();

        std::thread::scope(|scope| {
            for payload in &payloads {
                let store = &store;
                scope.spawn(move || {
                    for _ in 0..10 {
                        store.put("k.jpg", payload).unwrap();
                    }
                });
            }
        });

        let stored = store.get("k.jpg").unwrap();
        assert!(payloads.contains(&stored));
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["k.jpg".to_string()]);
    }

    #[test]
    fn test_keys_cannot_escape_store() {
        let store = MemoryBlobStore::new();
        for key in ["", ".", "..", "../x.jpg", "a/b.jpg", "a\\b.jpg"] {
            assert!(
                matches!(store.put(key, b"x"), Err(StoreError::InvalidKey(_))),
                "key {key:?} accepted"
            );
        }
        let fs = FsBlobStore::new("/tmp/never-written");
        assert!(fs.path_for("../etc/passwd").is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryBlobStore::new();
        assert!(store.is_empty());
        store.put("k", b"v").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k").unwrap(), b"v");
        store.delete("k").unwrap();
        assert!(!store.contains("k"));
    }
}
