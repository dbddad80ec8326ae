//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Each photo leads with its positional index and file name; the relative
//! source path and per-derivative status follow as indented context lines.
//! The same two-level shape is used by `check` and `build`, so the two
//! commands read as the same inventory.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Photos (3)
//! 001 dawn.jpg
//!     Source: landscape/dawn.jpg
//!     Tier: web-safe → direct
//! 002 market.heic
//!     Source: street/market.heic
//!     Tier: native (heif) → heif-convert
//!
//! Platform: generic
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 ✓ dawn.jpg (Canon EOS R5)
//!     Source: landscape/dawn.jpg
//!     thumbnail: encoded
//!     optimized: original
//! 002 ✗ market.heic: heif-convert not found
//!
//! Cataloged 1 photo, 1 failed
//!     street/market.heic: heif-convert not found
//! Catalog: src/data/photos.json
//! Cache: 1 encoded
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::process::{DerivativeStatus, ProcessEvent, RunReport};
use crate::scan::SourceFile;
use crate::strategy::{self, Platform};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn status_label(status: DerivativeStatus) -> &'static str {
    match status {
        DerivativeStatus::Encoded => "encoded",
        DerivativeStatus::Cached => "cached",
        DerivativeStatus::Original => "original",
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the discovered photos with their tier and the strategy the
/// current platform would use.
pub fn format_check_output(files: &[SourceFile], platform: Platform) -> Vec<String> {
    let mut lines = vec![format!("Photos ({})", files.len())];
    for (i, file) in files.iter().enumerate() {
        let strategy = strategy::select_strategy(file.tier, platform);
        lines.push(format!("{} {}", format_index(i + 1), file.file_name));
        lines.push(format!("    Source: {}", file.relative));
        lines.push(format!("    Tier: {} → {}", file.tier, strategy));
    }
    lines.push(String::new());
    lines.push(format!("Platform: {}", platform));
    lines
}

pub fn print_check_output(files: &[SourceFile], platform: Platform) {
    for line in format_check_output(files, platform) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Processed {
            index,
            file_name,
            relative_path,
            camera,
            derivatives,
            ..
        } => {
            let detail = camera.as_deref().unwrap_or("no EXIF");
            let mut lines = vec![
                format!("{} ✓ {} ({})", format_index(*index), file_name, detail),
                format!("    Source: {}", relative_path),
            ];
            for d in derivatives {
                lines.push(format!("    {}: {}", d.kind, status_label(d.status)));
            }
            lines
        }
        ProcessEvent::Failed {
            index,
            file_name,
            reason,
            ..
        } => vec![format!("{} ✗ {}: {}", format_index(*index), file_name, reason)],
    }
}

/// Format the end-of-run summary.
pub fn format_summary(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();
    let cataloged = plural(report.records.len(), "photo");
    if report.failures.is_empty() {
        lines.push(format!("Cataloged {}", cataloged));
    } else {
        lines.push(format!(
            "Cataloged {}, {} failed",
            cataloged,
            report.failures.len()
        ));
        for failure in &report.failures {
            lines.push(format!("    {}: {}", failure.relative_path, failure.reason));
        }
    }
    lines.push(format!("Catalog: {}", report.catalog_path.display()));
    lines.push(format!("Cache: {}", report.cache));
    lines
}

pub fn print_summary(report: &RunReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}
