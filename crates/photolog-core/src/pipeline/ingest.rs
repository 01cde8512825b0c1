//! Ingestion orchestration: uploads in, committed catalog records out.
//!
//! Per upload: validate the filename, store the original under a generated
//! name, derive thumbnail + preview, extract metadata, build the record.
//! Only validation and storage of the original can reject an upload;
//! derivation and extraction failures degrade the record instead. The
//! batch's records are appended to the catalog in one save.
//!
//! Blob I/O, EXIF parsing and image work run on the blocking pool.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::{Config, IngestConfig};
use crate::error::{DerivationError, JournalError, Result, StoreError};
use crate::store::{BlobStore, Stores};
use crate::types::{IngestReport, MetadataResult, PhotoRecord, SkippedUpload, Upload};

use super::metadata::MetadataExtractor;
use super::naming;
use super::resize::{DerivedImages, Resizer};

/// Runs uploads through the pipeline and owns deletion.
pub struct Ingestor {
    rules: IngestConfig,
    resizer: Resizer,
    extractor: Arc<MetadataExtractor>,
    stores: Stores,
    catalog: Catalog,
    decode_timeout_ms: u64,
}

/// Run blocking store work on the blocking pool.
async fn blocking<T, F>(work: F) -> std::result::Result<T, StoreError>
where
    F: FnOnce() -> std::result::Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}

impl Ingestor {
    /// Create an ingestor writing to `stores` and `catalog`.
    pub fn new(config: &Config, stores: Stores, catalog: Catalog) -> Self {
        Self {
            rules: config.ingest.clone(),
            resizer: Resizer::from_config(config),
            extractor: Arc::new(MetadataExtractor::new()),
            stores,
            catalog,
            decode_timeout_ms: config.limits.decode_timeout_ms,
        }
    }

    /// The catalog this ingestor commits to.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The blob stores this ingestor writes to.
    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Ingest a batch of uploads.
    ///
    /// Invalid uploads are skipped and reported. The batch fails only when
    /// nothing was accepted or the catalog cannot be saved.
    pub async fn ingest(&self, uploads: Vec<Upload>) -> Result<IngestReport> {
        let submitted = uploads.len();
        let start = std::time::Instant::now();
        let mut report = IngestReport::default();

        for upload in uploads {
            match self.ingest_one(upload).await {
                Ok(record) => report.created.push(record),
                Err(skipped) => {
                    tracing::info!(
                        filename = %skipped.filename,
                        reason = %skipped.reason,
                        "Skipped upload"
                    );
                    report.skipped.push(skipped);
                }
            }
        }

        if report.created.is_empty() {
            return Err(JournalError::NoUsableFiles { submitted });
        }

        let pending = std::mem::take(&mut report.created);
        let catalog = self.catalog.clone();
        let batch = pending.clone();
        let committed = tokio::task::spawn_blocking(move || catalog.append(batch))
            .await
            .map_err(|e| JournalError::Store(StoreError::Task(e.to_string())))
            .and_then(|appended| appended.map_err(JournalError::from));
        match committed {
            Ok(appended) => report.created = appended,
            Err(e) => {
                for record in &pending {
                    self.remove_artifacts(record);
                }
                return Err(e);
            }
        }

        tracing::info!(
            "Ingested {}/{} upload(s) in {:?}",
            report.created.len(),
            submitted,
            start.elapsed()
        );
        Ok(report)
    }

    async fn ingest_one(&self, upload: Upload) -> std::result::Result<PhotoRecord, SkippedUpload> {
        let filename = upload.filename;
        let skip = |reason: String| SkippedUpload {
            filename: filename.clone(),
            reason,
        };

        let ext = naming::validate_filename(&filename, &self.rules).map_err(skip)?;
        let original_filename = naming::sanitize_filename(&filename, &ext);
        let id = Uuid::new_v4().to_string();
        let stored = naming::stored_filename(&id, &ext);
        tracing::debug!("Ingesting {:?} as {}", filename, stored);

        // Everything downstream reads the persisted original.
        let original = self
            .persist_original(&stored, upload.bytes)
            .await
            .map_err(skip)?;

        let derived = match self
            .resizer
            .derive_with_timeout(&stored, original.clone(), self.decode_timeout_ms)
            .await
        {
            Ok(derived) => self.store_derived(&stored, derived).await,
            Err(e) => Err(e),
        };
        if let Err(e) = derived {
            tracing::warn!(stored = %stored, error = %e, "Derivation failed, record kept without derived images");
        }

        let extractor = Arc::clone(&self.extractor);
        let metadata = tokio::task::spawn_blocking(move || extractor.extract(&original))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(stored = %stored, error = %e, "Metadata extraction task failed");
                MetadataResult::default()
            });

        Ok(PhotoRecord::new(
            id,
            original_filename,
            stored,
            Utc::now(),
            metadata,
        ))
    }

    /// Write the original and read it back. A stored original that cannot be
    /// read back is removed again.
    async fn persist_original(
        &self,
        stored: &str,
        bytes: Vec<u8>,
    ) -> std::result::Result<Vec<u8>, String> {
        let originals = Arc::clone(&self.stores.originals);
        let key = stored.to_string();

        let written = blocking(move || originals.put(&key, &bytes).map(|()| (originals, key)))
            .await
            .map_err(|e| format!("cannot store original: {e}"))?;
        let (originals, key) = written;

        blocking(move || match originals.get(&key) {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                if let Err(cleanup) = originals.delete(&key) {
                    tracing::warn!(key = %key, error = %cleanup, "Cannot remove unreadable original");
                }
                Err(e)
            }
        })
        .await
        .map_err(|e| format!("cannot read back original: {e}"))
    }

    /// Write both tiers or neither.
    async fn store_derived(
        &self,
        stored: &str,
        derived: DerivedImages,
    ) -> std::result::Result<(), DerivationError> {
        let stores = self.stores.clone();
        let thumb_key = naming::thumbnail_name(stored);
        let preview_key = naming::preview_name(stored);

        blocking(move || {
            stores.thumbnails.put(&thumb_key, &derived.thumbnail)?;
            if let Err(e) = stores.previews.put(&preview_key, &derived.preview) {
                if let Err(cleanup) = stores.thumbnails.delete(&thumb_key) {
                    tracing::warn!(key = %thumb_key, error = %cleanup, "Cannot remove orphaned thumbnail");
                }
                return Err(e);
            }
            Ok(())
        })
        .await
        .map_err(|source| DerivationError::Store {
            name: stored.to_string(),
            source,
        })
    }

    /// Delete a photo: its artifacts best-effort, then its catalog record.
    pub fn delete(&self, id: &str) -> Result<PhotoRecord> {
        let record = self
            .catalog
            .get(id)
            .ok_or_else(|| JournalError::NotFound(id.to_string()))?;

        self.remove_artifacts(&record);

        let removed = self
            .catalog
            .remove(id)?
            .ok_or_else(|| JournalError::NotFound(id.to_string()))?;
        tracing::info!(id = %id, "Deleted photo {}", removed.original_filename);
        Ok(removed)
    }

    fn remove_artifacts(&self, record: &PhotoRecord) {
        let artifacts: [(&dyn BlobStore, &str); 3] = [
            (self.stores.originals.as_ref(), &record.stored_filename),
            (self.stores.thumbnails.as_ref(), &record.thumbnail_name),
            (self.stores.previews.as_ref(), &record.preview_name),
        ];
        for (store, key) in artifacts {
            match store.delete(key) {
                Ok(()) => tracing::debug!(key = %key, "Removed artifact"),
                Err(StoreError::NotFound(_)) => {
                    tracing::warn!(id = %record.id, key = %key, "Artifact already missing")
                }
                Err(e) => tracing::warn!(id = %record.id, key = %key, error = %e, "Cannot remove artifact"),
            }
        }
    }
}
