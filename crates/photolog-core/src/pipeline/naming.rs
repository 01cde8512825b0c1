//! Filename handling for uploads and the artifacts derived from them.
//!
//! Client filenames are untrusted: they are only ever displayed. Storage
//! names are generated (`{id}.{ext}`) and every derived artifact name is a
//! pure function of the stored name:
//! - original: `{stored}`
//! - thumbnail: `thumb_{stored}`
//! - preview: `preview_{stored}`

use unicode_normalization::UnicodeNormalization;

use crate::config::IngestConfig;

const THUMBNAIL_PREFIX: &str = "thumb_";
const PREVIEW_PREFIX: &str = "preview_";

/// Final path component of a client filename, splitting on both separators.
fn base_name(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

/// Lower-cased extension of a client filename, if it has one.
///
/// - `"IMG_0001.JPG"` → `Some("jpg")`
/// - `"archive.tar.gz"` → `Some("gz")`
/// - `"README"`, `"trailing."` → `None`
pub fn extension(filename: &str) -> Option<String> {
    let (_, ext) = base_name(filename).rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Check a client filename against the allowed extension set.
///
/// Returns the lower-cased extension on success, or the rejection reason.
pub fn validate_filename(filename: &str, config: &IngestConfig) -> Result<String, String> {
    if filename.trim().is_empty() {
        return Err("empty filename".to_string());
    }
    match extension(filename) {
        Some(ext) if config.allows(&ext) => Ok(ext),
        Some(ext) => Err(format!("extension .{ext} is not allowed")),
        None => Err("missing file extension".to_string()),
    }
}

/// Make a client filename safe to display and echo back.
///
/// Directory components are dropped and accented letters are folded to
/// ASCII (NFKD, combining marks discarded). Whitespace runs become `_`,
/// anything outside `[A-Za-z0-9._-]` is removed and leading/trailing dots and
/// underscores are trimmed. Falls back to `upload.{ext}` when nothing
/// survives.
pub fn sanitize_filename(filename: &str, ext: &str) -> String {
    let folded: String = base_name(filename).nfkd().collect();
    let joined = folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        format!("upload.{ext}")
    } else {
        trimmed.to_string()
    }
}

/// Storage name for an original: `{id}.{ext}`.
pub fn stored_filename(id: &str, ext: &str) -> String {
    format!("{id}.{ext}")
}

/// Thumbnail artifact name for a stored original.
pub fn thumbnail_name(stored_filename: &str) -> String {
    format!("{THUMBNAIL_PREFIX}{stored_filename}")
}

/// Preview artifact name for a stored original.
pub fn preview_name(stored_filename: &str) -> String {
    format!("{PREVIEW_PREFIX}{stored_filename}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(extension("IMG_0001.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension("dir.d/README"), None);
        assert_eq!(extension("trailing."), None);
        assert_eq!(extension(""), None);
    }

    #[test]
    fn test_validate_filename() {
        let config = IngestConfig::default();
        assert_eq!(validate_filename("a.JPeG", &config), Ok("jpeg".to_string()));
        assert_eq!(validate_filename("a.webp", &config), Ok("webp".to_string()));
        assert!(validate_filename("", &config).is_err());
        assert!(validate_filename("notes.txt", &config)
            .unwrap_err()
            .contains(".txt"));
        assert!(validate_filename("noext", &config).is_err());
    }

    #[test]
    fn test_sanitize_strips_paths_and_unsafe_chars() {
        assert_eq!(sanitize_filename("../../etc/passwd.jpg", "jpg"), "passwd.jpg");
        assert_eq!(sanitize_filename("C:\\Users\\me\\cat.png", "png"), "cat.png");
        assert_eq!(sanitize_filename("My Photo (1).JPG", "jpg"), "My_Photo_1.JPG");
        assert_eq!(sanitize_filename(".hidden.gif", "gif"), "hidden.gif");
    }

    #[test]
    fn test_sanitize_folds_accents_to_ascii() {
        assert_eq!(sanitize_filename("café.jpg", "jpg"), "cafe.jpg");
        assert_eq!(sanitize_filename("Ñandú 2.png", "png"), "Nandu_2.png");
        assert_eq!(sanitize_filename("ｐｈｏｔｏ.gif", "gif"), "photo.gif");
    }

    #[test]
    fn test_sanitize_falls_back_when_nothing_survives() {
        assert_eq!(sanitize_filename("日本.jpg", "jpg"), "jpg");
        assert_eq!(sanitize_filename("...", "png"), "upload.png");
    }

    #[test]
    fn test_artifact_names_derive_from_stored_name() {
        let stored = stored_filename("0f8e", "png");
        assert_eq!(stored, "0f8e.png");
        assert_eq!(thumbnail_name(&stored), "thumb_0f8e.png");
        assert_eq!(preview_name(&stored), "preview_0f8e.png");
    }
}
