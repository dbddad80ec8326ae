//! Stable identifiers and derivative names.
//!
//! A photo's id is its path relative to the source root with separators turned
//! into dashes and the extension dropped:
//!
//! - `landscape/dawn.jpg` → `landscape-dawn`
//! - `street/2024/market.heic` → `street-2024-market`
//! - `loose.png` → `loose`
//!
//! Derivatives mirror the same relative path with a `.jpg` extension. Two
//! sources can map onto the same derivative (`dawn.jpg` next to `dawn.png`)
//! or the same id (`a/b.jpg` vs `a-b.jpg`). Collisions are resolved in scan
//! order, so the first file keeps the plain name and later ones get a suffix:
//!
//! - same extension-less path → `-<ext>` appended (`dawn-png`)
//! - same id → `-2`, `-3`, … appended
//!
//! Because scan order is sorted, the assignment is the same on every run.
//!
//! An id is stable while the set of colliding siblings is stable. Adding a
//! file that sorts earlier and shares the extension-less path takes over the
//! plain name: with only `a/dawn.png` the id is `a-dawn`, and once `a/dawn.jpg`
//! appears the png becomes `a-dawn-png` and its derivatives move with it.
//! Ids carry no extension and must be unique, so one of the two has to give.

use crate::scan::SourceFile;
use std::collections::HashSet;

/// Where a source file's derivatives go and what it is called in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Catalog id, unique within one run.
    pub id: String,
    /// Relative derivative path without extension, `/`-separated.
    pub stem: String,
}

/// Turn an extension-less relative path into an id.
pub fn base_id(relative_stem: &str) -> String {
    relative_stem.replace(['/', '\\'], "-")
}

/// Assign a [`Slot`] to every file, in order.
pub fn allocate_slots(files: &[SourceFile]) -> Vec<Slot> {
    let mut stems: HashSet<String> = HashSet::new();
    let mut ids: HashSet<String> = HashSet::new();

    files
        .iter()
        .map(|file| {
            let base = file.relative_stem();
            let mut stem = base.to_string();
            if !stems.insert(stem.to_lowercase()) {
                stem = format!("{base}-{}", file.extension);
                let mut n = 2;
                while !stems.insert(stem.to_lowercase()) {
                    stem = format!("{base}-{}-{n}", file.extension);
                    n += 1;
                }
            }

            let wanted = base_id(&stem);
            let mut id = wanted.clone();
            let mut n = 2;
            while !ids.insert(id.clone()) {
                id = format!("{wanted}-{n}");
                n += 1;
            }

            Slot { id, stem }
        })
        .collect()
}

/// Join path segments into a root-relative web path (`/a/b/c.jpg`).
///
/// Segments may themselves contain `/`; leading, trailing and doubled
/// slashes are collapsed. Backslashes are treated as separators too.
pub fn web_path(segments: &[&str]) -> String {
    let parts: Vec<&str> = segments
        .iter()
        .flat_map(|s| s.split(['/', '\\']))
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", parts.join("/"))
}
