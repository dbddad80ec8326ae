//! Shared test utilities for the contact-sheet test suite.
//!
//! Provides synthetic image writers, a minimal EXIF block builder, and
//! catalog lookups that panic with a clear message on miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let exif = ExifBuilder::new()
//!     .primary(TAG_MAKE, ExifValue::ascii("Canon"))
//!     .exif(TAG_DATE_TIME_ORIGINAL, ExifValue::ascii("2024:06:01 08:30:00"));
//! write_jpeg_with_exif(&tmp.path().join("a/dawn.jpg"), 64, 48, &exif);
//! ```

use std::path::Path;

use crate::types::PhotoRecord;

mod exif_block;
pub use exif_block::*;

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> image::RgbImage {
    image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write a synthetic image; the format follows the file extension.
/// Parent directories are created.
pub fn write_image(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    gradient(width, height).save(path).unwrap();
}

/// Encode a synthetic JPEG in memory.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

/// Splice an APP1 EXIF segment right after the JPEG SOI marker.
pub fn with_exif(jpeg: &[u8], exif: &ExifBuilder) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");
    let mut out = jpeg[..2].to_vec();
    out.extend(exif.app1_segment());
    out.extend(&jpeg[2..]);
    out
}

/// Write a synthetic JPEG that carries the given EXIF block.
pub fn write_jpeg_with_exif(path: &Path, width: u32, height: u32, exif: &ExifBuilder) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, with_exif(&jpeg_bytes(width, height), exif)).unwrap();
}

/// Write arbitrary bytes, creating parent directories.
pub fn write_file(path: &Path, contents: &[u8]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

// =========================================================================
// Catalog lookups
// =========================================================================

/// Find a record by id. Panics if not found.
pub fn find_record<'a>(records: &'a [PhotoRecord], id: &str) -> &'a PhotoRecord {
    records.iter().find(|r| r.id == id).unwrap_or_else(|| {
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        panic!("record '{id}' not found. Available: {ids:?}")
    })
}

/// All record ids in catalog order.
pub fn record_ids(records: &[PhotoRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}
