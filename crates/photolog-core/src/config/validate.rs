//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, LimitsConfig};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.ingest.allowed_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "ingest.allowed_extensions must not be empty".into(),
            ));
        }
        if self
            .ingest
            .allowed_extensions
            .iter()
            .any(|ext| ext.is_empty() || ext.contains('.') || ext.contains('/'))
        {
            return Err(ConfigError::ValidationError(
                "ingest.allowed_extensions entries must be bare extensions like \"jpg\"".into(),
            ));
        }
        if self.thumbnail.size == 0 {
            return Err(ConfigError::ValidationError(
                "thumbnail.size must be > 0".into(),
            ));
        }
        if self.preview.size == 0 {
            return Err(ConfigError::ValidationError(
                "preview.size must be > 0".into(),
            ));
        }
        if self.thumbnail.size > self.preview.size {
            return Err(ConfigError::ValidationError(
                "thumbnail.size must not exceed preview.size".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnail.quality) {
            return Err(ConfigError::ValidationError(
                "thumbnail.quality must be between 1 and 100".into(),
            ));
        }
        if !(1..=100).contains(&self.preview.quality) {
            return Err(ConfigError::ValidationError(
                "preview.quality must be between 1 and 100".into(),
            ));
        }
        if !(1..=LimitsConfig::MAX_UPLOAD_SIZE_MB).contains(&self.limits.max_upload_size_mb) {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_upload_size_mb must be between 1 and {}",
                LimitsConfig::MAX_UPLOAD_SIZE_MB
            )));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.server.upload_field.is_empty() {
            return Err(ConfigError::ValidationError(
                "server.upload_field must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let mut config = Config::default();
        config.ingest.allowed_extensions.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("allowed_extensions"));
    }

    #[test]
    fn test_validate_rejects_dotted_extension() {
        let mut config = Config::default();
        config.ingest.allowed_extensions = vec![".jpg".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("bare extensions"));
    }

    #[test]
    fn test_validate_rejects_zero_tier_size() {
        let mut config = Config::default();
        config.thumbnail.size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("thumbnail.size"));
    }

    #[test]
    fn test_validate_rejects_thumbnail_larger_than_preview() {
        let mut config = Config::default();
        config.thumbnail.size = 2000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_quality() {
        let mut config = Config::default();
        config.preview.quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("preview.quality"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.decode_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("decode_timeout_ms"));
    }

    #[test]
    fn test_validate_bounds_upload_size() {
        let mut config = Config::default();
        config.limits.max_upload_size_mb = u64::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_upload_size_mb"));

        config.limits.max_upload_size_mb = LimitsConfig::MAX_UPLOAD_SIZE_MB;
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.max_upload_bytes(), 4096 * 1024 * 1024);
    }

    #[test]
    fn test_upload_bytes_saturate() {
        let limits = LimitsConfig {
            max_upload_size_mb: u64::MAX,
            ..LimitsConfig::default()
        };
        assert_eq!(limits.max_upload_bytes(), usize::MAX);
    }
}
