//! Configuration management for Photolog.
//!
//! Configuration is loaded from the platform config directory
//! (`~/.config/photolog/config.toml` on Linux) with sensible defaults.
//! All config structs implement `Default`.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Photolog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where originals, derived images and the catalog live
    pub storage: StorageConfig,

    /// Upload acceptance rules
    pub ingest: IngestConfig,

    /// Thumbnail tier
    pub thumbnail: ThumbnailConfig,

    /// Preview tier
    pub preview: PreviewConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.photolog.photolog/config.toml
    /// - Linux: ~/.config/photolog/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\photolog\config\config.toml
    ///
    /// Falls back to ~/.photolog/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "photolog", "photolog")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".photolog").join("config.toml")
            })
    }

    /// Get the resolved data directory (with ~ expansion).
    pub fn data_dir(&self) -> PathBuf {
        let path_str = self.storage.data_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Directory holding uploaded originals.
    pub fn originals_dir(&self) -> PathBuf {
        self.resolve(&self.storage.originals_dir)
    }

    /// Directory holding thumbnail-tier images.
    pub fn thumbnails_dir(&self) -> PathBuf {
        self.resolve(&self.storage.thumbnails_dir)
    }

    /// Directory holding preview-tier images.
    pub fn previews_dir(&self) -> PathBuf {
        self.resolve(&self.storage.previews_dir)
    }

    /// Path of the persisted catalog document.
    pub fn catalog_path(&self) -> PathBuf {
        self.resolve(&self.storage.catalog_file)
    }

    /// Relative storage paths are anchored at `data_dir`.
    fn resolve(&self, path: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);
        if path.is_absolute() {
            path
        } else {
            self.data_dir().join(path)
        }
    }

    /// Config rooted at `dir`, for tests and throwaway journals.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.storage.data_dir = dir.into();
        config
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
