//! Core data types for the Photolog catalog and ingestion pipeline.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One accepted upload, as persisted in the catalog.
///
/// Records are immutable once created; the only mutation is deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Opaque unique identifier, never reused
    pub id: String,

    /// Sanitized client filename, for display only
    pub original_filename: String,

    /// `{id}.{ext}` with the lower-cased original extension
    pub stored_filename: String,

    /// `thumb_{stored_filename}`
    pub thumbnail_name: String,

    /// `preview_{stored_filename}`
    pub preview_name: String,

    /// Server-assigned ingestion time
    pub upload_timestamp: DateTime<Utc>,

    /// Capture date as `YYYY-MM-DD`, present iff `capture_time` is
    pub capture_date: Option<String>,

    /// Capture time as `HH:MM:SS`, present iff `capture_date` is
    pub capture_time: Option<String>,

    /// Camera attributes, verbatim tag values
    #[serde(default)]
    pub camera_info: CameraInfo,

    /// Every recognized tag from both metadata sources
    #[serde(default)]
    pub raw_tags: BTreeMap<String, String>,
}

impl PhotoRecord {
    /// Build a record from the ingestion outputs.
    ///
    /// Capture date and time are split from the same timestamp, so they are
    /// either both set or both absent.
    pub fn new(
        id: String,
        original_filename: String,
        stored_filename: String,
        upload_timestamp: DateTime<Utc>,
        metadata: MetadataResult,
    ) -> Self {
        let (capture_date, capture_time) = match metadata.captured_at {
            Some(dt) => (
                Some(dt.format("%Y-%m-%d").to_string()),
                Some(dt.format("%H:%M:%S").to_string()),
            ),
            None => (None, None),
        };
        Self {
            thumbnail_name: crate::pipeline::naming::thumbnail_name(&stored_filename),
            preview_name: crate::pipeline::naming::preview_name(&stored_filename),
            id,
            original_filename,
            stored_filename,
            upload_timestamp,
            capture_date,
            capture_time,
            camera_info: metadata.camera_info,
            raw_tags: metadata.raw_tags,
        }
    }

    /// The short form returned by the upload endpoint.
    pub fn summary(&self) -> PhotoSummary {
        PhotoSummary {
            id: self.id.clone(),
            original_filename: self.original_filename.clone(),
            stored_filename: self.stored_filename.clone(),
            thumbnail_name: self.thumbnail_name.clone(),
            preview_name: self.preview_name.clone(),
            upload_timestamp: self.upload_timestamp,
            capture_date: self.capture_date.clone(),
            capture_time: self.capture_time.clone(),
        }
    }
}

/// Camera attributes resolved from the merged tag set.
///
/// Each field is absent when none of its candidate tags was present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lens: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aperture: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutter_speed: Option<String>,
}

impl CameraInfo {
    /// True when no attribute was resolved.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Output of the metadata extractor for one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataResult {
    /// First candidate timestamp that parsed
    pub captured_at: Option<NaiveDateTime>,

    /// Resolved camera attributes
    pub camera_info: CameraInfo,

    /// Merged tags, later sources overwriting earlier ones on equal keys
    pub raw_tags: BTreeMap<String, String>,
}

/// Record summary returned to uploaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSummary {
    pub id: String,
    pub original_filename: String,
    pub stored_filename: String,
    pub thumbnail_name: String,
    pub preview_name: String,
    pub upload_timestamp: DateTime<Utc>,
    pub capture_date: Option<String>,
    pub capture_time: Option<String>,
}

/// One raw file received from a client.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied filename, untrusted
    pub filename: String,

    /// File contents
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Why an upload was not ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedUpload {
    /// Client-supplied filename
    pub filename: String,

    /// Human-readable reason
    pub reason: String,
}

/// Outcome of one ingestion batch.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Records created and committed by this batch, in submission order
    pub created: Vec<PhotoRecord>,

    /// Uploads rejected by validation
    pub skipped: Vec<SkippedUpload>,
}

impl IngestReport {
    /// The message shown to uploaders.
    pub fn message(&self) -> String {
        format!("Successfully uploaded {} photo(s)", self.created.len())
    }
}
