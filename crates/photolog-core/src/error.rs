//! Error types for the Photolog ingestion pipeline and catalog.
//!
//! Errors are organized by stage. Extraction and derivation errors are
//! degraded (logged, never propagated) at the ingestion boundary; catalog,
//! store and configuration errors surface to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Photolog operations.
#[derive(Error, Debug)]
pub enum JournalError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog persistence errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Blob store errors (originals, thumbnails, previews)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// No record with the given id exists in the catalog
    #[error("Photo not found: {0}")]
    NotFound(String),

    /// A batch contained no file that passed validation
    #[error("No usable files in upload batch ({submitted} submitted)")]
    NoUsableFiles { submitted: usize },

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failure of one metadata source to produce tags.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The source found no metadata block in the file
    #[error("{source_name}: no EXIF data")]
    NoExif { source_name: &'static str },

    /// The metadata block exists but could not be read
    #[error("{source_name}: {message}")]
    Read {
        source_name: &'static str,
        message: String,
    },
}

/// Failure to produce the derived thumbnail/preview pair for one original.
#[derive(Error, Debug)]
pub enum DerivationError {
    /// Source image could not be decoded
    #[error("Decode error for {name}: {message}")]
    Decode { name: String, message: String },

    /// A derived tier could not be encoded
    #[error("Encode error for {name} ({tier}): {message}")]
    Encode {
        name: String,
        tier: &'static str,
        message: String,
    },

    /// Decode + resize did not finish in time
    #[error("Timeout deriving {name} after {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u64 },

    /// Writing a derived artifact failed
    #[error("Failed to store derived image for {name}: {source}")]
    Store {
        name: String,
        #[source]
        source: StoreError,
    },
}

/// Blob store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No blob under this key
    #[error("Blob not found: {0}")]
    NotFound(String),

    /// Key would escape the store (path separators, `..`, empty)
    #[error("Invalid blob key: {0:?}")]
    InvalidKey(String),

    /// Underlying filesystem failure
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A blocking store task panicked or was cancelled
    #[error("Store task failed: {0}")]
    Task(String),
}

/// Catalog persistence errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Failed to write the catalog file
    #[error("Failed to write catalog {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the catalog
    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convenience type alias for Photolog results.
pub type Result<T> = std::result::Result<T, JournalError>;
