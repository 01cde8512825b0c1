//! Orientation-normalizing resizer: one original in, thumbnail + preview out.
//!
//! Every derived image is upright (EXIF orientation applied), opaque
//! (transparency composited onto white) and JPEG-encoded, scaled down with
//! Lanczos3 to fit its tier's bounding box. Sources already inside the box
//! keep their size.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageReader, Rgb, RgbImage};
use std::io::Cursor;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::{Config, Tier};
use crate::error::DerivationError;

use super::metadata::read_orientation;

/// The encoded artifacts for one original.
#[derive(Debug, Clone)]
pub struct DerivedImages {
    /// Thumbnail-tier JPEG
    pub thumbnail: Vec<u8>,
    /// Preview-tier JPEG
    pub preview: Vec<u8>,
}

/// Produces the derived tiers for uploaded originals.
#[derive(Debug, Clone, Copy)]
pub struct Resizer {
    thumbnail: Tier,
    preview: Tier,
}

impl Resizer {
    /// Create a resizer for the given tiers.
    pub fn new(thumbnail: Tier, preview: Tier) -> Self {
        Self { thumbnail, preview }
    }

    /// Resizer using the configured thumbnail and preview tiers.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.thumbnail.tier(), config.preview.tier())
    }

    /// Derive both tiers on the blocking pool, giving up after `timeout_ms`.
    pub async fn derive_with_timeout(
        &self,
        name: &str,
        bytes: Vec<u8>,
        timeout_ms: u64,
    ) -> Result<DerivedImages, DerivationError> {
        let resizer = *self;
        let name_owned = name.to_string();
        let task = tokio::task::spawn_blocking(move || resizer.derive(&name_owned, &bytes));

        match timeout(Duration::from_millis(timeout_ms), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(DerivationError::Decode {
                name: name.to_string(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(DerivationError::Timeout {
                name: name.to_string(),
                timeout_ms,
            }),
        }
    }

    /// Derive both tiers synchronously.
    ///
    /// `name` only labels errors. Either both tiers are produced or an error
    /// is returned.
    pub fn derive(&self, name: &str, bytes: &[u8]) -> Result<DerivedImages, DerivationError> {
        let start = std::time::Instant::now();

        let decoded = Self::decode(name, bytes)?;
        let (width, height) = decoded.dimensions();
        let upright = Self::orient(decoded, bytes);
        let flat = flatten_onto_white(&upright);
        drop(upright);

        let thumbnail = Self::encode(&fit_within(&flat, self.thumbnail.size), self.thumbnail, name)?;
        let preview = Self::encode(&fit_within(&flat, self.preview.size), self.preview, name)?;

        tracing::debug!(
            "Derived {} ({}x{}) in {:?}: thumbnail {}B, preview {}B",
            name,
            width,
            height,
            start.elapsed(),
            thumbnail.len(),
            preview.len()
        );
        Ok(DerivedImages { thumbnail, preview })
    }

    fn decode(name: &str, bytes: &[u8]) -> Result<DynamicImage, DerivationError> {
        let decode_err = |message: String| DerivationError::Decode {
            name: name.to_string(),
            message,
        };
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| decode_err(format!("Cannot detect image format: {}", e)))?
            .decode()
            .map_err(|e| decode_err(e.to_string()))
    }

    /// Apply the EXIF orientation tag; untagged images are already upright.
    fn orient(mut image: DynamicImage, bytes: &[u8]) -> DynamicImage {
        if let Some(orientation) = read_orientation(bytes).and_then(Orientation::from_exif) {
            image.apply_orientation(orientation);
        }
        image
    }

    fn encode(image: &RgbImage, tier: Tier, name: &str) -> Result<Vec<u8>, DerivationError> {
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, tier.quality)
            .encode_image(image)
            .map_err(|e| DerivationError::Encode {
                name: name.to_string(),
                tier: tier.name,
                message: e.to_string(),
            })?;
        Ok(buf)
    }
}

/// Composite any alpha onto an opaque white background.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = a as u16;
        let blend = |c: u8| ((c as u16 * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Target dimensions fitting `width`×`height` into a `size` box, aspect kept.
///
/// Never upscales; the longer edge lands exactly on `size` when shrinking.
fn fit_dimensions(width: u32, height: u32, size: u32) -> (u32, u32) {
    if width <= size && height <= size {
        return (width, height);
    }
    let (w, h, s) = (width as u64, height as u64, size as u64);
    if w >= h {
        (size, ((h * s + w / 2) / w).max(1) as u32)
    } else {
        (((w * s + h / 2) / h).max(1) as u32, size)
    }
}

fn fit_within(image: &RgbImage, size: u32) -> RgbImage {
    let (width, height) = fit_dimensions(image.width(), image.height(), size);
    if (width, height) == image.dimensions() {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Lanczos3)
}
