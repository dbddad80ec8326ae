//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations every backend must
//! support: decode (from a file or from bytes), report dimensions, and write a
//! resized JPEG derivative.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Formats it can't decode never reach it: the
//! [`strategy`](crate::strategy) layer hands it a JPEG produced by a native
//! tool instead.

use super::params::DerivativeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Pixel dimensions of a decoded image, after orientation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// A decoded image is an opaque [`Self::Image`]; callers only ask it for its
/// dimensions and hand it back for encoding. Decoding happens once per source
/// and both derivatives are written from the same decoded image.
pub trait ImageBackend {
    type Image;

    /// Decode an image file, applying its EXIF orientation.
    fn decode_file(&self, path: &Path) -> Result<Self::Image, BackendError>;

    /// Decode an in-memory image (an embedded RAW preview).
    ///
    /// Previews often carry no orientation of their own; when that's the case
    /// `fallback_orientation` (the EXIF value of the container) is applied.
    fn decode_bytes(
        &self,
        bytes: &[u8],
        fallback_orientation: Option<u16>,
    ) -> Result<Self::Image, BackendError>;

    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Resize to exactly `params.width`×`params.height` and write a JPEG.
    fn write_jpeg(&self, image: &Self::Image, params: &DerivativeParams)
    -> Result<(), BackendError>;
}
