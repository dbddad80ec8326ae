//! Conversion strategy selection and execution.
//!
//! Stage 2 of the per-file pipeline. A source's [`FormatTier`] and the host
//! [`Platform`] pick one of four strategies:
//!
//! | Tier | macOS | Other hosts |
//! |---|---|---|
//! | web-safe, library | [`Strategy::Direct`] | [`Strategy::Direct`] |
//! | HEIC/HEIF | [`Strategy::Sips`] | [`Strategy::HeifConvert`] |
//! | camera RAW | [`Strategy::Sips`] | [`Strategy::EmbeddedPreview`] |
//!
//! Every strategy ends with a decoded image from the [`ImageBackend`]:
//!
//! - **Direct**: the backend decodes the source file.
//! - **Sips** / **HeifConvert**: the tool writes an intermediate JPEG into a
//!   [`Scratch`] directory; the backend decodes that. The scratch directory
//!   is dropped on every exit path.
//! - **EmbeddedPreview**: `exiftool -b` prints the JPEG embedded in the RAW
//!   container; the bytes go straight to the backend. `PreviewImage` is tried
//!   first and `JpgFromRaw` when the first is missing or suspiciously small.
//!
//! The platform is resolved once per run and passed in, so selection is a
//! pure function.

use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::config::ToolsConfig;
use crate::formats::{FormatTier, NativeFamily};
use crate::imaging::{BackendError, Dimensions, ImageBackend, OptimizedImageConfig};
use crate::tools::{Scratch, ToolCommand, ToolError, ToolRunner};

const PREVIEW_TAG: &str = "-PreviewImage";
const JPG_FROM_RAW_TAG: &str = "-JpgFromRaw";
const INTERMEDIATE_NAME: &str = "intermediate.jpg";

/// Host capability relevant to native-only formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `sips` is available and handles both HEIC and RAW.
    MacOs,
    /// No unified tool; HEIC and RAW take separate tool chains.
    Generic,
}

impl Platform {
    /// Compile-target detection.
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Generic
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::MacOs => write!(f, "macos"),
            Platform::Generic => write!(f, "generic"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Direct,
    Sips,
    HeifConvert,
    EmbeddedPreview,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Direct => write!(f, "direct"),
            Strategy::Sips => write!(f, "sips"),
            Strategy::HeifConvert => write!(f, "heif-convert"),
            Strategy::EmbeddedPreview => write!(f, "embedded preview"),
        }
    }
}

pub fn select_strategy(tier: FormatTier, platform: Platform) -> Strategy {
    match (tier, platform) {
        (FormatTier::WebSafe | FormatTier::LibraryConvertible, _) => Strategy::Direct,
        (FormatTier::NativeOnly(_), Platform::MacOs) => Strategy::Sips,
        (FormatTier::NativeOnly(NativeFamily::HighEfficiency), Platform::Generic) => {
            Strategy::HeifConvert
        }
        (FormatTier::NativeOnly(NativeFamily::CameraRaw), Platform::Generic) => {
            Strategy::EmbeddedPreview
        }
    }
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{tool} wrote no image")]
    NoIntermediate { tool: String },
}

/// Runs a [`Strategy`] against one source file.
pub struct Converter<'a, R, B> {
    pub runner: &'a R,
    pub backend: &'a B,
    pub tools: &'a ToolsConfig,
    /// Size and quality of tool-produced intermediates.
    pub intermediate: OptimizedImageConfig,
}

/// What the source's own metadata says before it's decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceHints {
    /// EXIF orientation. Only the embedded preview path needs it, because
    /// the preview stream usually has none.
    pub orientation: Option<u16>,
    /// Pixel size, when the metadata states one.
    pub size: Option<Dimensions>,
}

impl<R: ToolRunner, B: ImageBackend> Converter<'_, R, B> {
    /// Decode `source` through `strategy`.
    pub fn convert(
        &self,
        strategy: Strategy,
        source: &Path,
        hints: &SourceHints,
    ) -> Result<B::Image, ConvertError> {
        debug!(source = %source.display(), %strategy, "converting");
        match strategy {
            Strategy::Direct => Ok(self.backend.decode_file(source)?),
            Strategy::Sips => self.via_sips(source, hints.size),
            Strategy::HeifConvert => self.via_heif_convert(source),
            Strategy::EmbeddedPreview => {
                let bytes = self.extract_preview(source)?;
                Ok(self.backend.decode_bytes(&bytes, hints.orientation)?)
            }
        }
    }

    fn via_sips(&self, source: &Path, size: Option<Dimensions>) -> Result<B::Image, ConvertError> {
        let scratch = Scratch::new()?;
        let out = scratch.file(INTERMEDIATE_NAME);
        let mut command = ToolCommand::new(&self.tools.sips)
            .arg("-s")
            .arg("format")
            .arg("jpeg")
            .arg("-s")
            .arg("formatOptions")
            .arg(self.intermediate.quality.value().to_string());
        if let Some(bound) = self.sips_bound(size) {
            command = command.arg("-Z").arg(bound.to_string());
        }
        let command = command.arg(source).arg("--out").arg(&out);
        self.decode_intermediate(&scratch, &command)
    }

    /// `-Z` resamples the long edge to the bound even when that enlarges, so
    /// it's only passed for sources known to be larger. Anything else is
    /// converted at full size and bounded by the final encode.
    fn sips_bound(&self, size: Option<Dimensions>) -> Option<u32> {
        let bound = self.intermediate.max_dimension;
        size.filter(|d| d.width.max(d.height) > bound).map(|_| bound)
    }

    fn via_heif_convert(&self, source: &Path) -> Result<B::Image, ConvertError> {
        let scratch = Scratch::new()?;
        let out = scratch.file(INTERMEDIATE_NAME);
        let command = ToolCommand::new(&self.tools.heif_convert)
            .arg("-q")
            .arg(self.intermediate.quality.value().to_string())
            .arg(source)
            .arg(&out);
        self.decode_intermediate(&scratch, &command)
    }

    /// Run a converter whose last argument is the output path, then decode
    /// what it wrote. `scratch` outlives the decode and is dropped by the
    /// caller on both success and failure.
    fn decode_intermediate(
        &self,
        scratch: &Scratch,
        command: &ToolCommand,
    ) -> Result<B::Image, ConvertError> {
        self.runner.run(command)?;
        let expected = scratch.file(INTERMEDIATE_NAME);
        let produced = scratch
            .produced(&expected)?
            .ok_or_else(|| ConvertError::NoIntermediate {
                tool: command.program.clone(),
            })?;
        Ok(self.backend.decode_file(&produced)?)
    }

    /// Pull the embedded JPEG out of a RAW container.
    pub fn extract_preview(&self, source: &Path) -> Result<Vec<u8>, ConvertError> {
        let first = match self.exiftool_tag(source, PREVIEW_TAG) {
            Ok(bytes) if bytes.len() as u64 >= self.tools.min_preview_bytes => return Ok(bytes),
            other => other,
        };
        debug!(
            source = %source.display(),
            "preview missing or below {} bytes, trying {JPG_FROM_RAW_TAG}",
            self.tools.min_preview_bytes
        );
        let second = self.exiftool_tag(source, JPG_FROM_RAW_TAG);
        Ok(larger_preview(first, second, &self.tools.exiftool)?)
    }

    fn exiftool_tag(&self, source: &Path, tag: &str) -> Result<Vec<u8>, ToolError> {
        let command = ToolCommand::new(&self.tools.exiftool)
            .arg("-b")
            .arg(tag)
            .arg(source);
        Ok(self.runner.run(&command)?.stdout)
    }
}

/// Pick the larger non-empty preview of two attempts.
fn larger_preview(
    first: Result<Vec<u8>, ToolError>,
    second: Result<Vec<u8>, ToolError>,
    program: &str,
) -> Result<Vec<u8>, ToolError> {
    let best = match (first, second) {
        (Ok(a), Ok(b)) => {
            if b.len() >= a.len() {
                b
            } else {
                a
            }
        }
        (Ok(a), Err(e)) | (Err(e), Ok(a)) => {
            if a.is_empty() {
                return Err(e);
            }
            a
        }
        (Err(_), Err(e)) => return Err(e),
    };
    if best.is_empty() {
        return Err(ToolError::EmptyOutput {
            program: program.to_string(),
        });
    }
    Ok(best)
}
