//! Catalog ordering and persistence.
//!
//! The catalog is a pretty-printed JSON array of [`PhotoRecord`]s, replaced
//! wholesale on every run. Order is recomputed each time:
//!
//! 1. Records with a `dateTaken` come first, newest first. The timestamps are
//!    fixed-width RFC 3339 UTC strings, so string order is time order.
//! 2. Records without one follow, by file name.
//!
//! Ties fall back to file name and then id, so the order is total and two
//! runs over the same photos serialize identically.

use std::cmp::Ordering;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::types::PhotoRecord;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn compare_records(a: &PhotoRecord, b: &PhotoRecord) -> Ordering {
    let by_name = || a.file_name.cmp(&b.file_name).then_with(|| a.id.cmp(&b.id));
    match (&a.date_taken, &b.date_taken) {
        (Some(da), Some(db)) => db.cmp(da).then_with(by_name),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => by_name(),
    }
}

pub fn sort_records(records: &mut [PhotoRecord]) {
    records.sort_by(compare_records);
}

/// Serialize exactly as written to disk.
pub fn to_json(records: &[PhotoRecord]) -> Result<String, CatalogError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Replace the catalog at `path` atomically.
///
/// The JSON goes to a temp file in the same directory which is then renamed
/// over the target, so readers never see a half-written catalog.
pub fn write_catalog(path: &Path, records: &[PhotoRecord]) -> Result<(), CatalogError> {
    let json = to_json(records)?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(json.as_bytes())?;
    tmp.flush()?;
    // Temp files are created owner-only; the catalog is served to browsers.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn read_catalog(path: &Path) -> Result<Vec<PhotoRecord>, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
