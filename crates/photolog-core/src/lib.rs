//! Photolog Core - the ingestion pipeline and catalog of a photo journal.
//!
//! Uploaded images are stored, turned into display-ready derived images and
//! described by a catalog record built from their EXIF metadata.
//!
//! # Architecture
//!
//! ```text
//! Upload → Validate → Store original → Resize (thumbnail + preview)
//!                                    → Extract metadata → Record → Catalog
//! ```
//!
//! Originals and derived images live in [`BlobStore`]s; the catalog is a
//! single JSON document rewritten on every mutation. See [`catalog`] for the
//! single-writer assumption.
//!
//! # Usage
//!
//! ```rust,ignore
//! use photolog_core::{Config, Journal, Upload};
//!
//! #[tokio::main]
//! async fn main() -> photolog_core::Result<()> {
//!     let journal = Journal::open(Config::load()?)?;
//!     let bytes = std::fs::read("beach.jpg")?;
//!     let report = journal.ingest(vec![Upload::new("beach.jpg", bytes)]).await?;
//!     println!("{}", report.message());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod catalog;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-exports for convenient access
pub use catalog::Catalog;
pub use config::Config;
pub use error::{
    CatalogError, ConfigError, DerivationError, ExtractionError, JournalError, Result, StoreError,
};
pub use pipeline::{DiscoveredFile, FileDiscovery, Ingestor, MetadataExtractor, Resizer};
pub use store::{BlobStore, FsBlobStore, MemoryBlobStore, Stores};
pub use types::{
    CameraInfo, IngestReport, MetadataResult, PhotoRecord, PhotoSummary, SkippedUpload, Upload,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A photo journal: configuration, blob stores and catalog wired together.
pub struct Journal {
    config: Config,
    ingestor: Ingestor,
}

impl Journal {
    /// Open the journal described by `config`, creating its directories.
    pub fn open(config: Config) -> Result<Self> {
        for dir in [
            config.originals_dir(),
            config.thumbnails_dir(),
            config.previews_dir(),
        ] {
            std::fs::create_dir_all(&dir)?;
        }
        tracing::debug!("Opening journal at {}", config.data_dir().display());
        let stores = Stores::on_disk(&config);
        Ok(Self::with_stores(config, stores))
    }

    /// A journal over caller-provided stores. The catalog stays file-backed.
    pub fn with_stores(config: Config, stores: Stores) -> Self {
        let catalog = Catalog::new(config.catalog_path());
        let ingestor = Ingestor::new(&config, stores, catalog);
        Self { config, ingestor }
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The blob stores backing this journal.
    pub fn stores(&self) -> &Stores {
        self.ingestor.stores()
    }

    /// Ingest a batch of uploads; see [`Ingestor::ingest`].
    pub async fn ingest(&self, uploads: Vec<Upload>) -> Result<IngestReport> {
        self.ingestor.ingest(uploads).await
    }

    /// All records, newest upload first.
    pub fn list(&self) -> Vec<PhotoRecord> {
        self.ingestor.catalog().list()
    }

    /// Look up one record by id.
    pub fn get(&self, id: &str) -> Result<PhotoRecord> {
        self.ingestor
            .catalog()
            .get(id)
            .ok_or_else(|| JournalError::NotFound(id.to_string()))
    }

    /// Delete a record and its artifacts.
    pub fn delete(&self, id: &str) -> Result<PhotoRecord> {
        self.ingestor.delete(id)
    }
}
