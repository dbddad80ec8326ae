//! Derivative cache for incremental builds.
//!
//! Decoding and encoding dominate a build, especially when a native tool has
//! to convert the source first. This module lets the pipeline skip both when
//! the source file and the derivative parameters haven't changed since the
//! last build.
//!
//! # Design
//!
//! The cache only covers derivative writes. EXIF extraction and record
//! assembly always run, so the catalog content never depends on cache state.
//!
//! ## Cache keys
//!
//! Entries are keyed by the derivative's web path (`/thumbnails/a/b.jpg`).
//! Each stores:
//!
//! - **`source_hash`**: SHA-256 of the source file contents. Content-based
//!   rather than mtime-based so it survives `git checkout` (which resets
//!   modification times).
//! - **`params_hash`**: SHA-256 of the derivative kind, size bound, quality
//!   and conversion strategy. If any of these change, the derivative is
//!   re-encoded.
//! - **`source_width` / `source_height`**: the decoded source size, which
//!   feeds the catalog's width/height fallback when decoding is skipped.
//!
//! A hit requires a matching entry **and** the derivative still on disk.
//!
//! ## Bypassing the cache
//!
//! `build --no-cache` starts from an empty manifest, so every derivative is
//! re-encoded. Old files are overwritten naturally.

use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io;
use std::path::Path;
use tracing::warn;

use crate::imaging::{DerivativeKind, Dimensions};
use crate::strategy::Strategy;

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// A single cached derivative.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
    pub source_width: u32,
    pub source_height: u32,
}

/// On-disk cache manifest mapping derivative web paths to entries.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: BTreeMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Create an empty manifest (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Load from disk. Returns an empty manifest if the file doesn't exist
    /// or can't be parsed (version mismatch, corruption).
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable cache manifest");
                return Self::empty();
            }
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Stored source dimensions if `key` was built from the same source with
    /// the same parameters and `output` still exists.
    pub fn lookup(
        &self,
        key: &str,
        source_hash: &str,
        params_hash: &str,
        output: &Path,
    ) -> Option<Dimensions> {
        let entry = self.entries.get(key)?;
        if entry.source_hash == source_hash && entry.params_hash == params_hash && output.exists()
        {
            Some(Dimensions::new(entry.source_width, entry.source_height))
        } else {
            None
        }
    }

    pub fn insert(&mut self, key: String, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    /// Drop entries for derivatives that weren't part of this run.
    pub fn retain_keys(&mut self, live: &HashSet<String>) {
        self.entries.retain(|key, _| live.contains(key));
    }
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// SHA-256 hash of everything that shapes a derivative besides its source.
pub fn hash_derivative_params(
    kind: DerivativeKind,
    bound: u32,
    quality: u32,
    strategy: Strategy,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.to_string().as_bytes());
    hasher.update(b"\0");
    hasher.update(bound.to_le_bytes());
    hasher.update(quality.to_le_bytes());
    hasher.update(strategy.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} encoded ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} encoded", self.misses)
        }
    }
}
