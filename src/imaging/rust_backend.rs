//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, GIF, TIFF, BMP) | `image::ImageReader` with content sniffing |
//! | EXIF orientation | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |
//!
//! HEIC and RAW never get here directly; the [`strategy`](crate::strategy)
//! layer turns them into JPEG first.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::DerivativeParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::{BufRead, Cursor, Seek};
use std::path::Path;

/// Backend using the `image` crate for every pixel operation.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode with orientation applied.
///
/// The decoder's own EXIF orientation wins; `fallback` only applies when the
/// stream says nothing (or says "no transform").
fn decode_oriented<R: BufRead + Seek>(
    reader: ImageReader<R>,
    fallback: Option<u16>,
    label: &str,
) -> Result<DynamicImage, BackendError> {
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| BackendError::Decode(format!("Failed to decode {label}: {e}")))?;

    let own = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let orientation = match own {
        Orientation::NoTransforms => fallback
            .and_then(|v| u8::try_from(v).ok())
            .and_then(Orientation::from_exif)
            .unwrap_or(own),
        _ => own,
    };

    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| BackendError::Decode(format!("Failed to decode {label}: {e}")))?;
    img.apply_orientation(orientation);
    Ok(img)
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn decode_file(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        decode_oriented(reader, None, &path.display().to_string())
    }

    fn decode_bytes(
        &self,
        bytes: &[u8],
        fallback_orientation: Option<u16>,
    ) -> Result<DynamicImage, BackendError> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        decode_oriented(reader, fallback_orientation, "embedded preview")
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        Dimensions::new(image.width(), image.height())
    }

    fn write_jpeg(
        &self,
        image: &DynamicImage,
        params: &DerivativeParams,
    ) -> Result<(), BackendError> {
        let resized;
        let source = if (image.width(), image.height()) == (params.width, params.height) {
            image
        } else {
            resized = image.resize_exact(params.width, params.height, FilterType::Lanczos3);
            &resized
        };

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(source.to_rgb8());
        let file = std::fs::File::create(&params.output)?;
        let writer = std::io::BufWriter::new(file);
        let quality = params.quality.value().clamp(1, 100) as u8;
        rgb.write_with_encoder(JpegEncoder::new_with_quality(writer, quality))
            .map_err(|e| {
                BackendError::Encode(format!(
                    "JPEG encode failed for {}: {}",
                    params.output.display(),
                    e
                ))
            })
    }
}
