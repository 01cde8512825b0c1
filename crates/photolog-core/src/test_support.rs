//! Fixture builders shared by the unit tests.
//!
//! Images are encoded in memory; EXIF blocks are assembled by hand as
//! little-endian TIFF structures and spliced into JPEGs as an APP1 segment.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

pub const RED: Rgb<u8> = Rgb([220, 20, 20]);
pub const BLUE: Rgb<u8> = Rgb([20, 20, 220]);

/// A JPEG whose left half is red and right half is blue.
pub fn split_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, _| if x < width / 2 { RED } else { BLUE });
    encode_jpeg(&img)
}

/// A solid gray JPEG.
pub fn plain_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode_jpeg(&RgbImage::from_pixel(width, height, Rgb([128, 128, 128])))
}

pub fn encode_jpeg(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 95)
        .encode_image(img)
        .unwrap();
    buf
}

/// A fully transparent PNG.
pub fn transparent_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

/// An opaque RGB PNG without any metadata.
pub fn plain_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 160, 90]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

/// Decode derived bytes for assertions.
pub fn decode(bytes: &[u8]) -> DynamicImage {
    image::load_from_memory(bytes).unwrap()
}

/// A TIFF value for one IFD entry.
#[derive(Debug, Clone)]
pub enum Val {
    Ascii(&'static str),
    Short(u16),
    Long(u32),
    Rational(u32, u32),
    Undefined(Vec<u8>),
}

impl Val {
    fn type_and_bytes(&self) -> (u16, u32, Vec<u8>) {
        match self {
            Val::Ascii(s) => {
                let mut b = s.as_bytes().to_vec();
                b.push(0);
                (2, b.len() as u32, b)
            }
            Val::Short(v) => (3, 1, v.to_le_bytes().to_vec()),
            Val::Long(v) => (4, 1, v.to_le_bytes().to_vec()),
            Val::Rational(n, d) => {
                let mut b = n.to_le_bytes().to_vec();
                b.extend_from_slice(&d.to_le_bytes());
                (5, 1, b)
            }
            Val::Undefined(b) => (7, b.len() as u32, b.clone()),
        }
    }
}

/// Serialize one IFD located at `offset`; oversized values follow it.
fn build_ifd(entries: &[(u16, Val)], offset: u32) -> Vec<u8> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|(tag, _)| *tag);

    let table_len = 2 + 12 * sorted.len() as u32 + 4;
    let mut table = Vec::new();
    let mut data = Vec::new();
    table.extend_from_slice(&(sorted.len() as u16).to_le_bytes());
    for (tag, val) in &sorted {
        let (ty, count, bytes) = val.type_and_bytes();
        table.extend_from_slice(&tag.to_le_bytes());
        table.extend_from_slice(&ty.to_le_bytes());
        table.extend_from_slice(&count.to_le_bytes());
        if bytes.len() <= 4 {
            let mut inline = bytes.clone();
            inline.resize(4, 0);
            table.extend_from_slice(&inline);
        } else {
            let value_offset = offset + table_len + data.len() as u32;
            table.extend_from_slice(&value_offset.to_le_bytes());
            data.extend_from_slice(&bytes);
            if data.len() % 2 == 1 {
                data.push(0);
            }
        }
    }
    table.extend_from_slice(&0u32.to_le_bytes());
    table.extend_from_slice(&data);
    table
}

/// Assemble a TIFF-structured EXIF block from primary-IFD and Exif-IFD entries.
pub fn exif_tiff(ifd0: &[(u16, Val)], exif_ifd: &[(u16, Val)]) -> Vec<u8> {
    const EXIF_POINTER: u16 = 0x8769;
    let mut primary = ifd0.to_vec();
    if !exif_ifd.is_empty() {
        primary.push((EXIF_POINTER, Val::Long(0)));
    }
    let sized = build_ifd(&primary, 8);
    let exif_offset = 8 + sized.len() as u32;
    if !exif_ifd.is_empty() {
        if let Some(entry) = primary.iter_mut().find(|(tag, _)| *tag == EXIF_POINTER) {
            entry.1 = Val::Long(exif_offset);
        }
    }

    let mut out = b"II".to_vec();
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());
    out.extend_from_slice(&build_ifd(&primary, 8));
    if !exif_ifd.is_empty() {
        out.extend_from_slice(&build_ifd(exif_ifd, exif_offset));
    }
    out
}

/// Insert `tiff` into `jpeg` as an APP1 Exif segment right after SOI.
pub fn with_exif(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    let payload_len = (2 + 6 + tiff.len()) as u16;
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&payload_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// A split red/blue JPEG carrying only an orientation tag.
pub fn oriented_jpeg(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let tiff = exif_tiff(&[(0x0112, Val::Short(orientation))], &[]);
    with_exif(&split_jpeg(width, height), &tiff)
}

/// A JPEG with a typical camera EXIF block.
pub fn camera_jpeg() -> Vec<u8> {
    let tiff = exif_tiff(
        &[
            (0x010F, Val::Ascii("FUJIFILM")),
            (0x0110, Val::Ascii("X-T3")),
            (0x0112, Val::Short(1)),
            (0x0132, Val::Ascii("2023:07:05 08:00:00")),
        ],
        &[
            (0x829A, Val::Rational(1, 250)),
            (0x829D, Val::Rational(28, 10)),
            (0x8827, Val::Short(400)),
            (0x920A, Val::Rational(35, 1)),
            (0xA434, Val::Ascii("XF35mmF1.4 R")),
        ],
    );
    with_exif(&plain_jpeg(64, 48), &tiff)
}
