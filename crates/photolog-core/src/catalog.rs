//! The persisted photo catalog.
//!
//! The catalog is one pretty-printed JSON array of [`PhotoRecord`]s. Every
//! mutation loads the whole array, applies the change and rewrites the file
//! through a temp-file rename.
//!
//! # Concurrency
//!
//! `append` and `remove` are read-modify-write cycles. Clones of one
//! [`Catalog`] share a lock, so mutations through them are serialized. There
//! is no file lock: separate processes (or independently constructed
//! catalogs) writing the same file lose updates, last writer wins.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::CatalogError;
use crate::store::write_atomic;
use crate::types::PhotoRecord;

/// File-backed catalog of photo records.
#[derive(Debug, Clone)]
pub struct Catalog {
    path: PathBuf,
    writes: Arc<Mutex<()>>,
}

impl Catalog {
    /// Catalog persisted at `path`. Nothing is read or created yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writes: Arc::new(Mutex::new(())),
        }
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Location of the catalog document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records in insertion order.
    ///
    /// A missing file is an empty catalog; so is one that fails to read or
    /// parse, after a warning.
    pub fn load(&self) -> Vec<PhotoRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Cannot read catalog, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Corrupt catalog, treating as empty");
                Vec::new()
            }
        }
    }

    /// Overwrite the persisted catalog with `records`.
    pub fn save(&self, records: &[PhotoRecord]) -> Result<(), CatalogError> {
        let mut json = serde_json::to_string_pretty(records)?;
        json.push('\n');

        let write_err = |source: std::io::Error| CatalogError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        write_atomic(&self.path, json.as_bytes()).map_err(write_err)
    }

    /// Append `records` in one load-mutate-save cycle.
    ///
    /// Records whose id is already cataloged are dropped. Returns the records
    /// actually appended.
    pub fn append(&self, records: Vec<PhotoRecord>) -> Result<Vec<PhotoRecord>, CatalogError> {
        let _guard = self.lock_writes();
        let mut all = self.load();
        let mut appended = Vec::with_capacity(records.len());
        for record in records {
            if all.iter().any(|r| r.id == record.id) {
                tracing::warn!(id = %record.id, "Duplicate photo id, record not appended");
                continue;
            }
            all.push(record.clone());
            appended.push(record);
        }
        self.save(&all)?;
        tracing::debug!(
            "Catalog now holds {} record(s) (+{})",
            all.len(),
            appended.len()
        );
        Ok(appended)
    }

    /// Remove the record with `id`.
    ///
    /// Returns `None`, without rewriting the file, when no such record exists.
    pub fn remove(&self, id: &str) -> Result<Option<PhotoRecord>, CatalogError> {
        let _guard = self.lock_writes();
        let mut all = self.load();
        let Some(index) = all.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let removed = all.remove(index);
        self.save(&all)?;
        Ok(Some(removed))
    }

    /// Look up one record.
    pub fn get(&self, id: &str) -> Option<PhotoRecord> {
        self.load().into_iter().find(|r| r.id == id)
    }

    /// All records, newest upload first.
    pub fn list(&self) -> Vec<PhotoRecord> {
        let mut records = self.load();
        sort_newest_first(&mut records);
        records
    }
}

/// Order by `upload_timestamp` descending; ties keep catalog order.
pub fn sort_newest_first(records: &mut [PhotoRecord]) {
    records.sort_by(|a, b| b.upload_timestamp.cmp(&a.upload_timestamp));
}
