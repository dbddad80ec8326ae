//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.
//! A source is decoded once by the caller and both derivatives are written
//! from that same image.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{fit_inside_dimensions, thumbnail_dimensions};
use super::params::{DerivativeKind, DerivativeParams, Quality};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration for thumbnail generation.
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    pub width: u32,
    pub quality: Quality,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 400,
            quality: Quality::new(80),
        }
    }
}

impl From<&crate::config::ThumbnailsConfig> for ThumbnailConfig {
    fn from(c: &crate::config::ThumbnailsConfig) -> Self {
        Self {
            width: c.width,
            quality: Quality::new(c.quality),
        }
    }
}

/// Configuration for optimized full-size generation.
#[derive(Debug, Clone)]
pub struct OptimizedImageConfig {
    pub max_dimension: u32,
    pub quality: Quality,
}

impl Default for OptimizedImageConfig {
    fn default() -> Self {
        Self {
            max_dimension: 2048,
            quality: Quality::new(90),
        }
    }
}

impl From<&crate::config::OptimizedConfig> for OptimizedImageConfig {
    fn from(c: &crate::config::OptimizedConfig) -> Self {
        Self {
            max_dimension: c.max_dimension,
            quality: Quality::new(c.quality),
        }
    }
}

/// Plan a thumbnail write without executing it.
pub fn plan_thumbnail(
    source: Dimensions,
    output_path: &Path,
    config: &ThumbnailConfig,
) -> DerivativeParams {
    let (width, height) = thumbnail_dimensions(source.as_tuple(), config.width);
    DerivativeParams {
        kind: DerivativeKind::Thumbnail,
        output: output_path.to_path_buf(),
        width,
        height,
        quality: config.quality,
    }
}

/// Plan an optimized write without executing it.
pub fn plan_optimized(
    source: Dimensions,
    output_path: &Path,
    config: &OptimizedImageConfig,
) -> DerivativeParams {
    let (width, height) = fit_inside_dimensions(source.as_tuple(), config.max_dimension);
    DerivativeParams {
        kind: DerivativeKind::Optimized,
        output: output_path.to_path_buf(),
        width,
        height,
        quality: config.quality,
    }
}

/// Execute a planned write, creating the output directory first.
pub fn write_derivative<B: ImageBackend>(
    backend: &B,
    image: &B::Image,
    params: &DerivativeParams,
) -> Result<()> {
    if let Some(parent) = params.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    backend.write_jpeg(image, params)
}

/// Create a thumbnail from a decoded image.
pub fn create_thumbnail<B: ImageBackend>(
    backend: &B,
    image: &B::Image,
    output_path: &Path,
    config: &ThumbnailConfig,
) -> Result<DerivativeParams> {
    let params = plan_thumbnail(backend.dimensions(image), output_path, config);
    write_derivative(backend, image, &params)?;
    Ok(params)
}

/// Create the optimized full-size JPEG from a decoded image.
pub fn create_optimized<B: ImageBackend>(
    backend: &B,
    image: &B::Image,
    output_path: &Path,
    config: &OptimizedImageConfig,
) -> Result<DerivativeParams> {
    let params = plan_optimized(backend.dimensions(image), output_path, config);
    write_derivative(backend, image, &params)?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::*;
    use tempfile::TempDir;

    #[test]
    fn plan_thumbnail_scales_to_width() {
        let params = plan_thumbnail(
            Dimensions::new(4000, 3000),
            Path::new("/thumbs/a.jpg"),
            &ThumbnailConfig::default(),
        );
        assert_eq!((params.width, params.height), (400, 300));
        assert_eq!(params.kind, DerivativeKind::Thumbnail);
        assert_eq!(params.quality.value(), 80);
    }

    #[test]
    fn plan_thumbnail_small_source_not_upscaled() {
        let params = plan_thumbnail(
            Dimensions::new(240, 180),
            Path::new("/thumbs/a.jpg"),
            &ThumbnailConfig::default(),
        );
        assert_eq!((params.width, params.height), (240, 180));
    }

    #[test]
    fn plan_optimized_fits_inside_bound() {
        let params = plan_optimized(
            Dimensions::new(3000, 6000),
            Path::new("/opt/a.jpg"),
            &OptimizedImageConfig::default(),
        );
        assert_eq!((params.width, params.height), (1024, 2048));
        assert_eq!(params.kind, DerivativeKind::Optimized);
        assert_eq!(params.quality.value(), 90);
    }

    #[test]
    fn config_conversions_carry_values() {
        let thumb = ThumbnailConfig::from(&crate::config::ThumbnailsConfig {
            width: 320,
            quality: 70,
        });
        assert_eq!(thumb.width, 320);
        assert_eq!(thumb.quality.value(), 70);

        let opt = OptimizedImageConfig::from(&crate::config::OptimizedConfig {
            max_dimension: 1600,
            quality: 85,
        });
        assert_eq!(opt.max_dimension, 1600);
        assert_eq!(opt.quality.value(), 85);
    }

    #[test]
    fn create_thumbnail_uses_backend_and_creates_dirs() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("thumbnails/landscape/dawn.jpg");
        let backend = MockBackend::new();

        let params = create_thumbnail(
            &backend,
            &Dimensions::new(1600, 1200),
            &output,
            &ThumbnailConfig::default(),
        )
        .unwrap();

        assert_eq!((params.width, params.height), (400, 300));
        assert!(output.exists());
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::WriteJpeg {
                kind: DerivativeKind::Thumbnail,
                width: 400,
                height: 300,
                quality: 80,
                ..
            }
        ));
    }

    #[test]
    fn create_optimized_keeps_small_source_size() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("optimized/scan.jpg");
        let backend = MockBackend::new();

        create_optimized(
            &backend,
            &Dimensions::new(800, 600),
            &output,
            &OptimizedImageConfig::default(),
        )
        .unwrap();

        assert!(matches!(
            &backend.writes()[0],
            RecordedOp::WriteJpeg {
                kind: DerivativeKind::Optimized,
                width: 800,
                height: 600,
                ..
            }
        ));
    }
}
