//! # Contact Sheet
//!
//! Builds the photo catalog for a static gallery site. Photos live under the
//! site's public directory, one subdirectory per category; each run produces
//! a thumbnail for every photo, a browser-friendly copy for every photo the
//! browser can't show directly, and a JSON catalog of normalized EXIF data.
//!
//! # Architecture: One Sequential Pass
//!
//! ```text
//! public/photos/  →  scan          (files + format tier + category)
//!                 →  strategy      (direct / sips / heif-convert / preview)
//!                 →  imaging       (thumbnail + optimized JPEG)
//!                 →  metadata      (EXIF → display fields)
//!                 →  catalog       (sorted, atomically written JSON)
//! ```
//!
//! Files are processed one at a time. A file that fails is logged and left
//! out of the catalog; only a missing source directory stops the run.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`formats`] | Extension → format tier |
//! | [`scan`] | Walks the source root, derives categories |
//! | [`naming`] | Record ids, derivative stems, web paths |
//! | [`strategy`] | Chooses and runs the conversion path for each tier |
//! | [`tools`] | Native tool invocation and scratch directories |
//! | [`imaging`] | Pure-Rust decode, resize and JPEG encode |
//! | [`metadata`] | EXIF extraction and normalization |
//! | [`types`] | The catalog record |
//! | [`catalog`] | Sort order and catalog persistence |
//! | [`cache`] | Skips unchanged derivatives across runs |
//! | [`process`] | The per-file pipeline and the run |
//! | [`config`] | `contact-sheet.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Three Format Tiers
//!
//! JPEG, PNG, WebP and friends are served as-is; the catalog points straight
//! at the original and only a thumbnail is generated. TIFF and BMP decode
//! in-process but need a JPEG copy for the browser. HEIC and camera RAW can't
//! be decoded in pure Rust at all, so a native tool turns them into something
//! the `image` crate can read first.
//!
//! ## Native Tools Are a Failure Domain
//!
//! `sips`, `heif-convert` and `exiftool` may be missing, broken, or slow. Every
//! invocation goes through [`tools::ToolRunner`], so a missing tool is just a
//! per-file failure and tests can script tool behavior without installing
//! anything.
//!
//! ## Deterministic Output
//!
//! Scan order is sorted, ids are allocated in scan order, and the catalog
//! order is total. Two runs over the same photos write byte-identical
//! catalogs, with or without the derivative cache.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod formats;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod strategy;
pub mod tools;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
