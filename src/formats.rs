//! Format classification by file extension.
//!
//! Every known extension maps to exactly one capability tier:
//!
//! | Tier | Extensions | Browser `src` | Decoder |
//! |---|---|---|---|
//! | [`FormatTier::WebSafe`] | jpg, jpeg, png, webp, gif | original file | `image` crate |
//! | [`FormatTier::LibraryConvertible`] | tif, tiff, bmp | optimized derivative | `image` crate |
//! | [`FormatTier::NativeOnly`] | heic, heif, camera RAW | optimized derivative | native tool chain |
//!
//! Unknown extensions are never classified; the scanner drops them silently.

use std::fmt;
use std::path::Path;

const WEB_SAFE: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

const LIBRARY_ONLY: &[&str] = &["tif", "tiff", "bmp"];

const HIGH_EFFICIENCY: &[&str] = &["heic", "heif"];

const CAMERA_RAW: &[&str] = &[
    "cr2", "cr3", "nef", "nrw", "arw", "srf", "sr2", "dng", "raf", "orf", "rw2", "pef", "srw",
];

/// Which formats a native tool has to handle, since the split decides the
/// tool chain on hosts without `sips`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeFamily {
    /// HEIC/HEIF containers.
    HighEfficiency,
    /// Vendor RAW containers with an embedded JPEG preview.
    CameraRaw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTier {
    /// Displayable by a browser as-is, and decodable by the image library.
    WebSafe,
    /// Decodable by the image library but not displayable by a browser.
    LibraryConvertible,
    /// Needs an external tool before the image library can touch it.
    NativeOnly(NativeFamily),
}

impl FormatTier {
    pub fn is_web_safe(self) -> bool {
        matches!(self, FormatTier::WebSafe)
    }
}

impl fmt::Display for FormatTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatTier::WebSafe => write!(f, "web-safe"),
            FormatTier::LibraryConvertible => write!(f, "library"),
            FormatTier::NativeOnly(NativeFamily::HighEfficiency) => write!(f, "native (heif)"),
            FormatTier::NativeOnly(NativeFamily::CameraRaw) => write!(f, "native (raw)"),
        }
    }
}

/// Classify an extension (without the dot, any case).
pub fn classify(extension: &str) -> Option<FormatTier> {
    let ext = extension.to_ascii_lowercase();
    let ext = ext.as_str();
    if WEB_SAFE.contains(&ext) {
        Some(FormatTier::WebSafe)
    } else if LIBRARY_ONLY.contains(&ext) {
        Some(FormatTier::LibraryConvertible)
    } else if HIGH_EFFICIENCY.contains(&ext) {
        Some(FormatTier::NativeOnly(NativeFamily::HighEfficiency))
    } else if CAMERA_RAW.contains(&ext) {
        Some(FormatTier::NativeOnly(NativeFamily::CameraRaw))
    } else {
        None
    }
}

/// Classify a path by its extension.
pub fn classify_path(path: &Path) -> Option<FormatTier> {
    path.extension().and_then(|e| e.to_str()).and_then(classify)
}

/// Union of every tier's extensions.
pub fn known_extensions() -> impl Iterator<Item = &'static str> {
    WEB_SAFE
        .iter()
        .chain(LIBRARY_ONLY)
        .chain(HIGH_EFFICIENCY)
        .chain(CAMERA_RAW)
        .copied()
}
