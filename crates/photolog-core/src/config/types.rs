//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage layout: three blob directories plus the catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory; relative paths below are anchored here
    pub data_dir: PathBuf,

    /// Uploaded originals, stored as `{id}.{ext}`
    pub originals_dir: PathBuf,

    /// Thumbnail tier, stored as `thumb_{stored_filename}`
    pub thumbnails_dir: PathBuf,

    /// Preview tier, stored as `preview_{stored_filename}`
    pub previews_dir: PathBuf,

    /// JSON catalog document
    pub catalog_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("~/.photolog"),
            originals_dir: PathBuf::from("uploads"),
            thumbnails_dir: PathBuf::from("thumbnails"),
            previews_dir: PathBuf::from("previews"),
            catalog_file: PathBuf::from("photos.json"),
        }
    }
}

/// Upload acceptance rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Accepted filename extensions (compared case-insensitively)
    pub allowed_extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "gif".to_string(),
                "webp".to_string(),
            ],
        }
    }
}

impl IngestConfig {
    /// Whether `ext` is in the allowed set.
    pub fn allows(&self, ext: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

/// A derived-image size/quality class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    /// Short name used in logs and errors
    pub name: &'static str,

    /// Bounding box edge in pixels (images fit within `size`×`size`)
    pub size: u32,

    /// JPEG quality, 1-100
    pub quality: u8,
}

/// Thumbnail tier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Bounding box edge in pixels
    pub size: u32,

    /// JPEG quality, 1-100
    pub quality: u8,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            size: 300,
            quality: 85,
        }
    }
}

impl ThumbnailConfig {
    pub fn tier(&self) -> Tier {
        Tier {
            name: "thumbnail",
            size: self.size,
            quality: self.quality,
        }
    }
}

/// Preview tier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Bounding box edge in pixels
    pub size: u32,

    /// JPEG quality, 1-100
    pub quality: u8,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            size: 1200,
            quality: 90,
        }
    }
}

impl PreviewConfig {
    pub fn tier(&self) -> Tier {
        Tier {
            name: "preview",
            size: self.size,
            quality: self.quality,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload request size in megabytes
    pub max_upload_size_mb: u64,

    /// Decode + resize timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_size_mb: 16,
            decode_timeout_ms: 30000,
        }
    }
}

impl LimitsConfig {
    /// Largest accepted `max_upload_size_mb`.
    pub const MAX_UPLOAD_SIZE_MB: u64 = 4096;

    /// Upload limit in bytes, saturating at `usize::MAX`.
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_size_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,

    /// Multipart field carrying the uploaded files
    pub upload_field: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5080".to_string(),
            upload_field: "photos".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
