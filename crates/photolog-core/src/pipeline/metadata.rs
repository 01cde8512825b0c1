//! EXIF metadata extraction from uploaded images.
//!
//! Two independent [`MetadataSource`]s read the same bytes:
//! - [`ContainerExifSource`] asks the image decoder for its embedded EXIF
//!   block and names tags by their bare EXIF name (`Make`, `DateTime`).
//! - [`TagScanSource`] scans the container for EXIF itself and qualifies
//!   names with their IFD group (`Image Make`, `EXIF DateTimeOriginal`).
//!
//! Tags are merged in source order, later sources overwriting equal keys.
//! Capture time and camera attributes are then resolved from the merged set
//! through fixed candidate lists. Extraction never fails: a source that
//! cannot read the file contributes nothing.

use chrono::NaiveDateTime;
use exif::{Context, Field, In, Reader, Tag, Value};
use image::{ImageDecoder, ImageReader};
use std::collections::BTreeMap;
use std::io::Cursor;

use crate::error::ExtractionError;
use crate::types::{CameraInfo, MetadataResult};

/// Timestamp fields tried in order; the first that parses wins.
const CAPTURE_CANDIDATES: [&str; 4] = [
    "DateTime",
    "EXIF DateTimeOriginal",
    "EXIF DateTimeDigitized",
    "Image DateTime",
];

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Undefined-typed values longer than this are embedded payloads, not tags.
const MAX_UNDEFINED_LEN: usize = 64;

/// A reader producing `(name, value)` tag pairs from image bytes.
pub trait MetadataSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Read all recognized tags, in file order.
    fn read_tags(&self, bytes: &[u8]) -> Result<Vec<(String, String)>, ExtractionError>;
}

/// EXIF as exposed by the image decoder for the detected container.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContainerExifSource;

impl MetadataSource for ContainerExifSource {
    fn name(&self) -> &'static str {
        "container"
    }

    fn read_tags(&self, bytes: &[u8]) -> Result<Vec<(String, String)>, ExtractionError> {
        let read_err = |message: String| ExtractionError::Read {
            source_name: self.name(),
            message,
        };

        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| read_err(e.to_string()))?;
        let mut decoder = reader.into_decoder().map_err(|e| read_err(e.to_string()))?;
        let raw = decoder
            .exif_metadata()
            .map_err(|e| read_err(e.to_string()))?
            .ok_or(ExtractionError::NoExif {
                source_name: self.name(),
            })?;

        // Some decoders hand back the APP1 payload with its identifier.
        let raw = match raw.strip_prefix(b"Exif\0\0") {
            Some(tiff) => tiff.to_vec(),
            None => raw,
        };
        let exif = Reader::new()
            .read_raw(raw)
            .map_err(|e| read_err(e.to_string()))?;

        Ok(exif
            .fields()
            .filter(|f| f.ifd_num == In::PRIMARY && !is_binary_payload(f))
            .map(|f| (tag_name(f.tag), value_string(f)))
            .collect())
    }
}

/// Direct EXIF scan of the container, names qualified by IFD group.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagScanSource;

impl TagScanSource {
    fn group(field: &Field) -> &'static str {
        match field.tag.context() {
            Context::Tiff if field.ifd_num == In::PRIMARY => "Image",
            Context::Tiff => "Thumbnail",
            Context::Exif => "EXIF",
            Context::Gps => "GPS",
            Context::Interop => "Interoperability",
            #[allow(unreachable_patterns)]
            _ => "Image",
        }
    }
}

impl MetadataSource for TagScanSource {
    fn name(&self) -> &'static str {
        "tag-scan"
    }

    fn read_tags(&self, bytes: &[u8]) -> Result<Vec<(String, String)>, ExtractionError> {
        let source_name = self.name();
        let exif = Reader::new()
            .continue_on_error(true)
            .read_from_container(&mut Cursor::new(bytes))
            .or_else(|e| {
                e.distill_partial_result(|errors| {
                    for error in errors {
                        tracing::debug!(source = source_name, error = %error, "Skipped damaged EXIF entry");
                    }
                })
            })
            .map_err(|e| match e {
                exif::Error::NotFound(_) => ExtractionError::NoExif { source_name },
                other => ExtractionError::Read {
                    source_name,
                    message: other.to_string(),
                },
            })?;

        Ok(exif
            .fields()
            .filter(|f| !is_binary_payload(f))
            .map(|f| (format!("{} {}", Self::group(f), tag_name(f.tag)), value_string(f)))
            .collect())
    }
}

/// Classic EXIF 2.2 name for a tag, as cameras and tools still report it.
fn tag_name(tag: Tag) -> String {
    match tag {
        Tag::PhotographicSensitivity => "ISOSpeedRatings".to_string(),
        other => other.to_string(),
    }
}

/// Tag value as a string: ASCII verbatim, everything else via its display form.
fn value_string(field: &Field) -> String {
    match &field.value {
        Value::Ascii(parts) => parts
            .iter()
            .map(|p| String::from_utf8_lossy(p).trim_end_matches(['\0', ' ']).to_string())
            .collect::<Vec<_>>()
            .join(" "),
        _ => field.display_value().to_string(),
    }
}

fn is_binary_payload(field: &Field) -> bool {
    field.tag == Tag::MakerNote
        || matches!(&field.value, Value::Undefined(bytes, _) if bytes.len() > MAX_UNDEFINED_LEN)
}

/// Extracts a [`MetadataResult`] by merging several metadata sources.
pub struct MetadataExtractor {
    sources: Vec<Box<dyn MetadataSource>>,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::with_sources(vec![Box::new(ContainerExifSource), Box::new(TagScanSource)])
    }
}

impl MetadataExtractor {
    /// The standard extractor: container EXIF first, then the tag scan.
    pub fn new() -> Self {
        Self::default()
    }

    /// An extractor over custom sources, merged in the given order.
    pub fn with_sources(sources: Vec<Box<dyn MetadataSource>>) -> Self {
        Self { sources }
    }

    /// Extract metadata from in-memory image bytes.
    ///
    /// Never fails: unreadable or absent metadata yields empty fields.
    pub fn extract(&self, bytes: &[u8]) -> MetadataResult {
        let raw_tags = self.merge(bytes);
        MetadataResult {
            captured_at: resolve_capture(&raw_tags),
            camera_info: resolve_camera(&raw_tags),
            raw_tags,
        }
    }

    fn merge(&self, bytes: &[u8]) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        for source in &self.sources {
            match source.read_tags(bytes) {
                Ok(tags) => {
                    tracing::trace!(source = source.name(), count = tags.len(), "Read tags");
                    merged.extend(tags);
                }
                Err(e @ ExtractionError::NoExif { .. }) => {
                    tracing::debug!(error = %e, "No metadata from source");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Metadata source failed");
                }
            }
        }
        merged
    }
}

/// EXIF orientation (1-8) of the primary image, if tagged.
pub fn read_orientation(bytes: &[u8]) -> Option<u8> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .and_then(|v| u8::try_from(v).ok())
}

/// First candidate timestamp that parses as `YYYY:MM:DD HH:MM:SS`.
fn resolve_capture(tags: &BTreeMap<String, String>) -> Option<NaiveDateTime> {
    CAPTURE_CANDIDATES
        .iter()
        .filter_map(|key| tags.get(*key))
        .find_map(|value| NaiveDateTime::parse_from_str(value, EXIF_DATETIME_FORMAT).ok())
}

/// Each attribute takes the first candidate present, verbatim.
fn resolve_camera(tags: &BTreeMap<String, String>) -> CameraInfo {
    let first = |candidates: [&str; 2]| candidates.iter().find_map(|k| tags.get(*k).cloned());
    CameraInfo {
        make: first(["Make", "Image Make"]),
        model: first(["Model", "Image Model"]),
        lens: first(["LensModel", "EXIF LensModel"]),
        focal_length: first(["FocalLength", "EXIF FocalLength"]),
        aperture: first(["FNumber", "EXIF FNumber"]),
        iso: first(["ISOSpeedRatings", "EXIF ISOSpeedRatings"]),
        shutter_speed: first(["ExposureTime", "EXIF ExposureTime"]),
    }
}
