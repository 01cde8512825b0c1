//! The ingestion pipeline.
//!
//! - **naming**: upload filename validation and artifact naming
//! - **metadata**: EXIF extraction from two independent sources
//! - **resize**: orientation-corrected thumbnail and preview derivation
//! - **discovery**: find importable images in directories
//! - **ingest**: orchestrates the stages and commits to the catalog

pub mod discovery;
pub mod ingest;
pub mod metadata;
pub mod naming;
pub mod resize;

// Re-exports for convenient access
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use ingest::Ingestor;
pub use metadata::{ContainerExifSource, MetadataExtractor, MetadataSource, TagScanSource};
pub use resize::{DerivedImages, Resizer};
