//! Project configuration.
//!
//! Handles loading, validating, and merging `contact-sheet.toml`. The file is
//! optional and sparse: stock defaults are the base layer and any key the user
//! sets overrides it.
//!
//! ## Config File Location
//!
//! ```text
//! project/
//! ├── contact-sheet.toml         # Optional, overrides stock defaults
//! ├── public/
//! │   ├── photos/                # Source root (first-level dir = category)
//! │   ├── thumbnails/            # Generated
//! │   └── optimized/             # Generated, only for non-web-safe sources
//! └── src/data/photos.json       # Generated catalog
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! [paths]
//! public = "public"                 # Web root; every web path is relative to it
//! photos = "photos"                 # Source root (relative to public)
//! thumbnails = "thumbnails"         # Thumbnails root (relative to public)
//! optimized = "optimized"           # Optimized root (relative to public)
//! catalog = "src/data/photos.json"  # Catalog file (relative to the project)
//! cache = ".contact-sheet-cache.json"
//!
//! [thumbnails]
//! width = 400
//! quality = 80
//!
//! [optimized]
//! max_dimension = 2048
//! quality = 90
//!
//! [catalog]
//! fallback_category = "uncategorized"
//!
//! [tools]
//! platform = "auto"                 # auto | macos | generic
//! timeout_secs = 120                # Omit for no timeout
//! min_preview_bytes = 50000
//! sips = "sips"
//! heif_convert = "heif-convert"
//! exiftool = "exiftool"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::strategy::Platform;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILENAME: &str = "contact-sheet.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `contact-sheet.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Directory layout.
    pub paths: PathsConfig,
    /// Thumbnail derivative settings.
    pub thumbnails: ThumbnailsConfig,
    /// Optimized derivative settings.
    pub optimized: OptimizedConfig,
    /// Catalog assembly settings.
    pub catalog: CatalogSection,
    /// Native tool settings.
    pub tools: ToolsConfig,
}

impl CatalogConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if !(1..=100).contains(&self.optimized.quality) {
            return Err(ConfigError::Validation(
                "optimized.quality must be 1-100".into(),
            ));
        }
        if self.thumbnails.width == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.width must be non-zero".into(),
            ));
        }
        if self.optimized.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "optimized.max_dimension must be non-zero".into(),
            ));
        }
        if self.tools.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "tools.timeout_secs must be non-zero (omit it for no timeout)".into(),
            ));
        }
        if self.catalog.fallback_category.trim().is_empty() {
            return Err(ConfigError::Validation(
                "catalog.fallback_category must not be empty".into(),
            ));
        }
        let p = &self.paths;
        if p.photos == p.thumbnails || p.photos == p.optimized || p.thumbnails == p.optimized {
            return Err(ConfigError::Validation(
                "paths.photos, paths.thumbnails and paths.optimized must be distinct".into(),
            ));
        }
        Ok(())
    }
}

/// Directory layout. Derivative and source roots live under `public` so
/// their web paths are simply `/<dir>/<relative path>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Web root, relative to the project.
    pub public: String,
    /// Source photos, relative to `public`.
    pub photos: String,
    /// Thumbnails, relative to `public`.
    pub thumbnails: String,
    /// Optimized derivatives, relative to `public`.
    pub optimized: String,
    /// Catalog JSON, relative to the project.
    pub catalog: String,
    /// Incremental-build cache manifest, relative to the project.
    pub cache: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            public: "public".to_string(),
            photos: "photos".to_string(),
            thumbnails: "thumbnails".to_string(),
            optimized: "optimized".to_string(),
            catalog: "src/data/photos.json".to_string(),
            cache: ".contact-sheet-cache.json".to_string(),
        }
    }
}

/// Absolute-ish locations resolved against a project directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPaths {
    pub public: PathBuf,
    pub photos: PathBuf,
    pub thumbnails: PathBuf,
    pub optimized: PathBuf,
    pub catalog: PathBuf,
    pub cache: PathBuf,
}

impl PathsConfig {
    pub fn resolve(&self, project: &Path) -> ResolvedPaths {
        let public = project.join(&self.public);
        ResolvedPaths {
            photos: public.join(&self.photos),
            thumbnails: public.join(&self.thumbnails),
            optimized: public.join(&self.optimized),
            catalog: project.join(&self.catalog),
            cache: project.join(&self.cache),
            public,
        }
    }
}

/// Thumbnail settings: fixed width, aspect ratio preserved, never upscaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Target width in pixels.
    pub width: u32,
    /// JPEG quality (1-100).
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            width: 400,
            quality: 80,
        }
    }
}

/// Optimized derivative settings: fit inside a square bound, never upscaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizedConfig {
    /// Neither output dimension exceeds this.
    pub max_dimension: u32,
    /// JPEG quality (1-100).
    pub quality: u32,
}

impl Default for OptimizedConfig {
    fn default() -> Self {
        Self {
            max_dimension: 2048,
            quality: 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogSection {
    /// Category assigned to photos sitting directly in the source root.
    pub fallback_category: String,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            fallback_category: "uncategorized".to_string(),
        }
    }
}

/// Which host capability set to assume when picking a conversion strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformChoice {
    /// Detect from the compile target.
    #[default]
    Auto,
    /// `sips` is available.
    Macos,
    /// Separate HEIF converter and exiftool.
    Generic,
}

impl PlatformChoice {
    /// Resolve to a concrete platform. Computed once per run.
    pub fn resolve(self) -> Platform {
        match self {
            PlatformChoice::Auto => Platform::detect(),
            PlatformChoice::Macos => Platform::MacOs,
            PlatformChoice::Generic => Platform::Generic,
        }
    }
}

/// Native tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub platform: PlatformChoice,
    /// Per-invocation timeout. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    /// Embedded previews smaller than this are treated as thumbnails, not
    /// full-size previews.
    pub min_preview_bytes: u64,
    /// Program names (or paths) of the native tools.
    pub sips: String,
    pub heif_convert: String,
    pub exiftool: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            platform: PlatformChoice::Auto,
            timeout_secs: None,
            min_preview_bytes: 50_000,
            sips: "sips".to_string(),
            heif_convert: "heif-convert".to_string(),
            exiftool: "exiftool".to_string(),
        }
    }
}

impl ToolsConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(CatalogConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `contact-sheet.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(project: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = project.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CatalogConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CatalogConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the project directory, falling back to stock defaults.
pub fn load_config(project: &Path) -> Result<CatalogConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(project)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `contact-sheet.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# contact-sheet configuration
# ===========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Directory layout
# ---------------------------------------------------------------------------
[paths]
# Web root. Every path written to the catalog is relative to it.
public = "public"
# Source photos, relative to the web root. The first directory level below
# it is the photo's category.
photos = "photos"
# Thumbnails root, relative to the web root. Mirrors the photos tree.
thumbnails = "thumbnails"
# Optimized derivatives, relative to the web root. Only formats a browser
# cannot display directly get one.
optimized = "optimized"
# Catalog JSON consumed by the gallery UI, relative to the project.
catalog = "src/data/photos.json"
# Incremental-build cache, relative to the project.
cache = ".contact-sheet-cache.json"

# ---------------------------------------------------------------------------
# Thumbnails (fixed width, aspect preserved, never upscaled)
# ---------------------------------------------------------------------------
[thumbnails]
width = 400
quality = 80

# ---------------------------------------------------------------------------
# Optimized derivatives (fit inside a square bound, never upscaled)
# ---------------------------------------------------------------------------
[optimized]
max_dimension = 2048
quality = 90

# ---------------------------------------------------------------------------
# Catalog
# ---------------------------------------------------------------------------
[catalog]
# Category for photos placed directly in the photos root.
fallback_category = "uncategorized"

# ---------------------------------------------------------------------------
# Native tools (HEIC/HEIF and camera RAW conversion)
# ---------------------------------------------------------------------------
[tools]
# auto    - detect from the host
# macos   - convert everything through sips
# generic - heif-convert for HEIC/HEIF, exiftool embedded previews for RAW
platform = "auto"
# Kill a tool that runs longer than this many seconds.
# Omit to wait indefinitely.
# timeout_secs = 120
# Embedded RAW previews smaller than this many bytes are rejected in favour
# of the next preview tag.
min_preview_bytes = 50000
sips = "sips"
heif_convert = "heif-convert"
exiftool = "exiftool"
"##
}
