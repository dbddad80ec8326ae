//! Source directory scanning.
//!
//! Stage 1 of the catalog build. Walks the photos root recursively and keeps
//! every file whose extension is known to [`formats`](crate::formats). The
//! first directory level below the root is the photo's category:
//!
//! ```text
//! public/photos/                   # Source root
//! ├── landscape/
//! │   ├── dawn.jpg                 # category "landscape"
//! │   └── iceland/
//! │       └── falls.nef            # category "landscape" (depth doesn't matter)
//! ├── street/
//! │   └── market.heic              # category "street"
//! ├── notes.txt                    # unknown extension, ignored
//! └── loose.png                    # category = fallback ("uncategorized")
//! ```
//!
//! Traversal is sorted by file name so two scans of an unchanged tree return
//! the same list in the same order. Hidden entries (dot-prefixed) are skipped.
//! Symlinked files are kept and read through the link; symlinked directories
//! are not descended into.
//!
//! A missing root is the one fatal condition of the whole run; an empty root
//! is not an error and yields an empty list.

use crate::formats::{self, FormatTier};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source directory not found: {0}")]
    SourceMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A photo file discovered under the source root.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Full path on disk.
    pub path: PathBuf,
    /// Path relative to the source root with `/` separators.
    pub relative: String,
    /// Final path component.
    pub file_name: String,
    /// Lowercased extension without the dot.
    pub extension: String,
    /// First directory below the root, or the fallback category.
    pub category: String,
    pub tier: FormatTier,
}

impl SourceFile {
    /// Relative path without its extension, `/`-separated.
    pub fn relative_stem(&self) -> &str {
        match self.relative.rfind('.') {
            Some(dot) if !self.relative[dot..].contains('/') => &self.relative[..dot],
            _ => &self.relative,
        }
    }
}

/// Scan `root` for known image files.
pub fn scan(root: &Path, fallback_category: &str) -> Result<Vec<SourceFile>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::SourceMissing(root.to_path_buf()));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        let Some(tier) = formats::classify_path(path) else {
            continue;
        };
        // `is_file` follows links: a symlinked photo counts, a dangling one doesn't.
        if !path.is_file() {
            if entry.path_is_symlink() {
                warn!(path = %path.display(), "skipping symlink that doesn't resolve to a file");
            }
            continue;
        }
        let Ok(relative_path) = path.strip_prefix(root) else {
            continue;
        };
        files.push(build_source_file(
            path,
            relative_path,
            tier,
            fallback_category,
        ));
    }

    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn build_source_file(
    path: &Path,
    relative_path: &Path,
    tier: FormatTier,
    fallback_category: &str,
) -> SourceFile {
    let segments: Vec<String> = relative_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let category = derive_category(&segments, fallback_category);
    let file_name = segments.last().cloned().unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    SourceFile {
        path: path.to_path_buf(),
        relative: segments.join("/"),
        file_name,
        extension,
        category,
        tier,
    }
}

/// The segment directly below the root, or the fallback when the file sits
/// at the root itself.
pub fn derive_category(segments: &[String], fallback: &str) -> String {
    if segments.len() > 1 {
        segments[0].clone()
    } else {
        fallback.to_string()
    }
}
