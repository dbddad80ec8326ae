//! The catalog build.
//!
//! Ties every stage together for one run:
//!
//! ```text
//! scan → allocate ids → for each file:
//!          select strategy → convert/decode → thumbnail (+ optimized)
//!          → read + normalize EXIF → PhotoRecord
//!        → sort → write catalog
//! ```
//!
//! ## Failure handling
//!
//! A missing source root is the only fatal condition, and it is detected by
//! the scan before anything is written. Everything that goes wrong with a
//! single file (decode error, missing tool, unwritable derivative) becomes a
//! [`Failure`] and the run moves on to the next file. The run itself is a
//! fold over the file list into `(records, failures)`.
//!
//! Missing or broken EXIF isn't a failure at all: the record is produced with
//! absent fields and decoder-observed dimensions.
//!
//! ## Output Structure
//!
//! ```text
//! public/
//! ├── photos/landscape/dawn.jpg        # source (web-safe: src points here)
//! ├── photos/street/market.heic        # source (converted)
//! ├── thumbnails/landscape/dawn.jpg    # every source gets one
//! ├── thumbnails/street/market.jpg
//! └── optimized/street/market.jpg      # only non-web-safe sources
//! ```
//!
//! ## Progress
//!
//! Callers that want per-file progress pass a channel sender; one
//! [`ProcessEvent`] is sent per file as soon as it's done.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{self, CacheEntry, CacheManifest, CacheStats};
use crate::catalog::{self, CatalogError};
use crate::config::{CatalogConfig, ResolvedPaths};
use crate::imaging::{
    BackendError, DerivativeKind, Dimensions, ImageBackend, OptimizedImageConfig, RustBackend,
    ThumbnailConfig, create_optimized, create_thumbnail,
};
use crate::metadata::{self, RawExif};
use crate::naming::{self, Slot};
use crate::scan::{self, ScanError, SourceFile};
use crate::strategy::{self, ConvertError, Converter, Platform, SourceHints, Strategy};
use crate::tools::{SystemRunner, ToolRunner};
use crate::types::PhotoRecord;

/// Errors that abort a whole run.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Failed to write catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Errors confined to one source file.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("{0}")]
    Convert(#[from] ConvertError),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a derivative came to exist in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeStatus {
    /// Decoded and encoded during this run.
    Encoded,
    /// Already up to date from a previous run.
    Cached,
    /// Not generated: the catalog points at the original file.
    Original,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeInfo {
    pub kind: DerivativeKind,
    pub status: DerivativeStatus,
}

/// Per-file progress, sent as each file finishes.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    Processed {
        /// 1-based position in scan order.
        index: usize,
        total: usize,
        file_name: String,
        relative_path: String,
        camera: Option<String>,
        derivatives: Vec<DerivativeInfo>,
    },
    Failed {
        index: usize,
        total: usize,
        file_name: String,
        relative_path: String,
        reason: String,
    },
}

/// A file that produced no record.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub file_name: String,
    pub relative_path: String,
    pub reason: String,
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    /// Sorted, exactly as written to the catalog.
    pub records: Vec<PhotoRecord>,
    pub failures: Vec<Failure>,
    pub catalog_path: PathBuf,
    pub cache: CacheStats,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Reuse derivatives from previous runs.
    pub use_cache: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { use_cache: true }
    }
}

/// Run the pipeline with the production backend and tool runner.
pub fn run(
    project: &Path,
    config: &CatalogConfig,
    options: &RunOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunReport, ProcessError> {
    let backend = RustBackend::new();
    let runner = SystemRunner::new(config.tools.timeout());
    let platform = config.tools.platform.resolve();
    run_with(&backend, &runner, platform, project, config, options, events)
}

/// Run the pipeline with explicit collaborators (allows testing with mocks).
pub fn run_with<B: ImageBackend, R: ToolRunner>(
    backend: &B,
    runner: &R,
    platform: Platform,
    project: &Path,
    config: &CatalogConfig,
    options: &RunOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunReport, ProcessError> {
    let paths = config.paths.resolve(project);
    let files = scan::scan(&paths.photos, &config.catalog.fallback_category)?;
    let slots = naming::allocate_slots(&files);
    debug!(files = files.len(), %platform, "scan complete");

    let mut manifest = if options.use_cache {
        CacheManifest::load(&paths.cache)
    } else {
        CacheManifest::empty()
    };
    let mut stats = CacheStats::default();

    let ctx = FileContext {
        backend,
        runner,
        platform,
        config,
        paths: &paths,
        thumbnail: ThumbnailConfig::from(&config.thumbnails),
        optimized: OptimizedImageConfig::from(&config.optimized),
    };

    let total = files.len();
    let (mut records, failures) = files.iter().zip(&slots).enumerate().fold(
        (Vec::new(), Vec::new()),
        |(mut records, mut failures), (i, (file, slot))| {
            let index = i + 1;
            match ctx.process_file(file, slot, &mut manifest, &mut stats) {
                Ok((record, derivatives)) => {
                    send(
                        &events,
                        ProcessEvent::Processed {
                            index,
                            total,
                            file_name: file.file_name.clone(),
                            relative_path: file.relative.clone(),
                            camera: record.camera.clone(),
                            derivatives,
                        },
                    );
                    records.push(record);
                }
                Err(err) => {
                    let reason = err.to_string();
                    warn!(file = %file.relative, %reason, "skipping file");
                    send(
                        &events,
                        ProcessEvent::Failed {
                            index,
                            total,
                            file_name: file.file_name.clone(),
                            relative_path: file.relative.clone(),
                            reason: reason.clone(),
                        },
                    );
                    failures.push(Failure {
                        file_name: file.file_name.clone(),
                        relative_path: file.relative.clone(),
                        reason,
                    });
                }
            }
            (records, failures)
        },
    );

    catalog::sort_records(&mut records);
    catalog::write_catalog(&paths.catalog, &records)?;

    let live: HashSet<String> = files
        .iter()
        .zip(&slots)
        .flat_map(|(file, slot)| ctx.plan(file, slot).into_iter().map(|p| p.web_path))
        .collect();
    manifest.retain_keys(&live);
    if let Err(err) = manifest.save(&paths.cache) {
        warn!(path = %paths.cache.display(), error = %err, "could not save cache manifest");
    }

    Ok(RunReport {
        records,
        failures,
        catalog_path: paths.catalog,
        cache: stats,
    })
}

fn send(events: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(event);
    }
}

/// One derivative a file needs.
#[derive(Debug, Clone)]
struct Planned {
    kind: DerivativeKind,
    web_path: String,
    output: PathBuf,
}

struct FileContext<'a, B, R> {
    backend: &'a B,
    runner: &'a R,
    platform: Platform,
    config: &'a CatalogConfig,
    paths: &'a ResolvedPaths,
    thumbnail: ThumbnailConfig,
    optimized: OptimizedImageConfig,
}

impl<B: ImageBackend, R: ToolRunner> FileContext<'_, B, R> {
    /// Derivatives for a file: always a thumbnail, plus an optimized copy
    /// when the browser can't show the original.
    fn plan(&self, file: &SourceFile, slot: &Slot) -> Vec<Planned> {
        let name = format!("{}.jpg", slot.stem);
        let mut planned = vec![Planned {
            kind: DerivativeKind::Thumbnail,
            web_path: naming::web_path(&[&self.config.paths.thumbnails, &name]),
            output: self.paths.thumbnails.join(&name),
        }];
        if !file.tier.is_web_safe() {
            planned.push(Planned {
                kind: DerivativeKind::Optimized,
                web_path: naming::web_path(&[&self.config.paths.optimized, &name]),
                output: self.paths.optimized.join(&name),
            });
        }
        planned
    }

    fn params_hash(&self, kind: DerivativeKind, strategy: Strategy) -> String {
        match kind {
            DerivativeKind::Thumbnail => cache::hash_derivative_params(
                kind,
                self.thumbnail.width,
                self.thumbnail.quality.value(),
                strategy,
            ),
            DerivativeKind::Optimized => cache::hash_derivative_params(
                kind,
                self.optimized.max_dimension,
                self.optimized.quality.value(),
                strategy,
            ),
        }
    }

    fn process_file(
        &self,
        file: &SourceFile,
        slot: &Slot,
        manifest: &mut CacheManifest,
        stats: &mut CacheStats,
    ) -> Result<(PhotoRecord, Vec<DerivativeInfo>), FileError> {
        let strategy = strategy::select_strategy(file.tier, self.platform);
        debug!(file = %file.relative, tier = %file.tier, %strategy, "processing");

        let raw = metadata::read_exif(&file.path).unwrap_or_else(|err| {
            debug!(file = %file.relative, error = %err, "no usable EXIF");
            RawExif::default()
        });

        let planned = self.plan(file, slot);
        let source_hash = cache::hash_file(&file.path)?;

        let mut decoded: Option<Dimensions> = None;
        let mut pending = Vec::new();
        let mut derivatives = Vec::new();
        for plan in &planned {
            let params_hash = self.params_hash(plan.kind, strategy);
            match manifest.lookup(&plan.web_path, &source_hash, &params_hash, &plan.output) {
                Some(dims) => {
                    debug!(output = %plan.web_path, "cache hit");
                    stats.hit();
                    decoded.get_or_insert(dims);
                    derivatives.push(DerivativeInfo {
                        kind: plan.kind,
                        status: DerivativeStatus::Cached,
                    });
                }
                None => pending.push((plan, params_hash)),
            }
        }

        if !pending.is_empty() {
            let converter = Converter {
                runner: self.runner,
                backend: self.backend,
                tools: &self.config.tools,
                intermediate: self.optimized.clone(),
            };
            let image = converter.convert(strategy, &file.path, &source_hints(&raw))?;
            let dims = self.backend.dimensions(&image);
            decoded = Some(dims);

            for (plan, params_hash) in pending {
                match plan.kind {
                    DerivativeKind::Thumbnail => {
                        create_thumbnail(self.backend, &image, &plan.output, &self.thumbnail)?;
                    }
                    DerivativeKind::Optimized => {
                        create_optimized(self.backend, &image, &plan.output, &self.optimized)?;
                    }
                }
                stats.miss();
                manifest.insert(
                    plan.web_path.clone(),
                    CacheEntry {
                        source_hash: source_hash.clone(),
                        params_hash,
                        source_width: dims.width,
                        source_height: dims.height,
                    },
                );
                derivatives.push(DerivativeInfo {
                    kind: plan.kind,
                    status: DerivativeStatus::Encoded,
                });
            }
        }

        if file.tier.is_web_safe() {
            derivatives.push(DerivativeInfo {
                kind: DerivativeKind::Optimized,
                status: DerivativeStatus::Original,
            });
        }
        derivatives.sort_by_key(|d| d.kind == DerivativeKind::Optimized);

        let find = |kind: DerivativeKind| planned.iter().find(|p| p.kind == kind);
        let thumbnail = find(DerivativeKind::Thumbnail)
            .map(|p| p.web_path.clone())
            .unwrap_or_default();
        let src = match find(DerivativeKind::Optimized) {
            Some(p) => p.web_path.clone(),
            None => naming::web_path(&[&self.config.paths.photos, &file.relative]),
        };

        let (width, height) = metadata::resolve_dimensions(&raw, decoded);
        let exif = metadata::normalize(&raw);

        let record = PhotoRecord {
            id: slot.id.clone(),
            file_name: file.file_name.clone(),
            src,
            thumbnail,
            category: file.category.clone(),
            width,
            height,
            date_taken: exif.date_taken,
            camera: exif.camera,
            lens: exif.lens,
            aperture: exif.aperture,
            shutter_speed: exif.shutter_speed,
            iso: exif.iso,
            focal_length: exif.focal_length,
        };
        Ok((record, derivatives))
    }
}

/// Orientation and stated size from the source's own EXIF, for converters
/// that can't read it themselves.
fn source_hints(raw: &RawExif) -> SourceHints {
    let (width, height) = metadata::resolve_dimensions(raw, None);
    SourceHints {
        orientation: raw.orientation,
        size: (width > 0 && height > 0).then(|| Dimensions::new(width, height)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::*;
    use crate::tools::tests::{MockRunner, MockStep};
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn photos(project: &Path) -> PathBuf {
        project.join("public/photos")
    }

    fn touch(project: &Path, rel: &str) {
        write_file(&photos(project).join(rel), b"not decoded by the mock");
    }

    fn dims(list: &[(u32, u32)]) -> Vec<Dimensions> {
        // MockBackend pops from the end
        list.iter().rev().map(|&(w, h)| Dimensions::new(w, h)).collect()
    }

    fn run_mock(
        project: &Path,
        backend: &MockBackend,
        runner: &MockRunner,
        platform: Platform,
    ) -> Result<RunReport, ProcessError> {
        run_with(
            backend,
            runner,
            platform,
            project,
            &CatalogConfig::default(),
            &RunOptions::default(),
            None,
        )
    }

    // =========================================================================
    // Fatal and empty runs
    // =========================================================================

    #[test]
    fn missing_source_is_fatal_and_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let catalog = tmp.path().join("src/data/photos.json");
        write_file(&catalog, b"previous");

        let result = run_mock(
            tmp.path(),
            &MockBackend::new(),
            &MockRunner::default(),
            Platform::Generic,
        );

        assert!(matches!(
            result,
            Err(ProcessError::Scan(ScanError::SourceMissing(_)))
        ));
        assert_eq!(std::fs::read_to_string(&catalog).unwrap(), "previous");
    }

    #[test]
    fn empty_source_writes_empty_catalog() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(photos(tmp.path())).unwrap();

        let report = run_mock(
            tmp.path(),
            &MockBackend::new(),
            &MockRunner::default(),
            Platform::Generic,
        )
        .unwrap();

        assert!(report.records.is_empty());
        assert!(report.failures.is_empty());
        assert_eq!(std::fs::read_to_string(&report.catalog_path).unwrap(), "[]");
    }

    // =========================================================================
    // Record assembly
    // =========================================================================

    #[test]
    fn web_safe_source_points_src_at_original() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "landscape/dawn.jpg");
        let backend = MockBackend::with_dimensions(dims(&[(4000, 3000)]));

        let report =
            run_mock(tmp.path(), &backend, &MockRunner::default(), Platform::Generic).unwrap();

        let record = find_record(&report.records, "landscape-dawn");
        assert_eq!(record.file_name, "dawn.jpg");
        assert_eq!(record.category, "landscape");
        assert_eq!(record.src, "/photos/landscape/dawn.jpg");
        assert_eq!(record.thumbnail, "/thumbnails/landscape/dawn.jpg");
        // No EXIF → decoded dimensions
        assert_eq!((record.width, record.height), (4000, 3000));
        assert_eq!(record.camera, None);

        let writes = backend.writes();
        assert_eq!(writes.len(), 1);
        assert!(matches!(
            &writes[0],
            RecordedOp::WriteJpeg { kind: DerivativeKind::Thumbnail, width: 400, height: 300, .. }
        ));
    }

    #[test]
    fn library_source_gets_optimized_derivative() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "scans/page.tiff");
        let backend = MockBackend::with_dimensions(dims(&[(5000, 2500)]));

        let report =
            run_mock(tmp.path(), &backend, &MockRunner::default(), Platform::Generic).unwrap();

        let record = &report.records[0];
        assert_eq!(record.src, "/optimized/scans/page.jpg");
        assert_eq!(record.thumbnail, "/thumbnails/scans/page.jpg");
        assert!(tmp.path().join("public/optimized/scans/page.jpg").exists());

        let writes = backend.writes();
        assert_eq!(writes.len(), 2);
        assert!(matches!(
            &writes[1],
            RecordedOp::WriteJpeg { kind: DerivativeKind::Optimized, width: 2048, height: 1024, .. }
        ));
    }

    #[test]
    fn root_file_gets_fallback_category() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "loose.png");
        let backend = MockBackend::with_dimensions(dims(&[(100, 100)]));

        let report =
            run_mock(tmp.path(), &backend, &MockRunner::default(), Platform::Generic).unwrap();
        assert_eq!(report.records[0].category, "uncategorized");
        assert_eq!(report.records[0].id, "loose");
    }

    #[test]
    fn raw_on_generic_host_uses_embedded_preview() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "trip/IMG_1.NEF");
        let backend = MockBackend::with_dimensions(dims(&[(6048, 4024)]));
        let runner = MockRunner::new(vec![MockStep::Stdout(vec![0; 60_000])]);

        let report = run_mock(tmp.path(), &backend, &runner, Platform::Generic).unwrap();

        assert_eq!(runner.programs(), vec!["exiftool"]);
        let record = &report.records[0];
        assert_eq!(record.src, "/optimized/trip/IMG_1.jpg");
        assert_eq!((record.width, record.height), (6048, 4024));
    }

    #[test]
    fn heic_on_macos_uses_sips() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "street/market.heic");
        let backend = MockBackend::with_dimensions(dims(&[(2048, 1536)]));
        let runner = MockRunner::new(vec![MockStep::WriteOutput(b"jpeg".to_vec())]);

        let report = run_mock(tmp.path(), &backend, &runner, Platform::MacOs).unwrap();

        assert_eq!(runner.programs(), vec!["sips"]);
        assert_eq!(report.records[0].src, "/optimized/street/market.jpg");
    }

    #[test]
    fn source_hints_only_state_a_size_when_both_axes_are_known() {
        let raw = RawExif {
            orientation: Some(6),
            exif_width: Some(4032),
            image_height: Some(3024),
            ..Default::default()
        };
        assert_eq!(
            source_hints(&raw),
            SourceHints {
                orientation: Some(6),
                size: Some(Dimensions::new(4032, 3024)),
            }
        );

        let half = RawExif {
            exif_width: Some(4032),
            exif_height: Some(0),
            ..Default::default()
        };
        assert_eq!(source_hints(&half).size, None);
        assert_eq!(source_hints(&RawExif::default()), SourceHints::default());
    }

    #[test]
    fn exif_fields_flow_into_record() {
        let tmp = TempDir::new().unwrap();
        let exif = ExifBuilder::new()
            .primary(TAG_MAKE, ExifValue::ascii("Canon"))
            .primary(TAG_MODEL, ExifValue::ascii("Canon EOS R5"))
            .exif(TAG_DATE_TIME_ORIGINAL, ExifValue::ascii("2024:06:01 08:30:00"))
            .exif(TAG_EXPOSURE_TIME, ExifValue::Rational(1, 100))
            .exif(TAG_PIXEL_X_DIMENSION, ExifValue::Long(8192))
            .exif(TAG_PIXEL_Y_DIMENSION, ExifValue::Long(5464));
        write_jpeg_with_exif(&photos(tmp.path()).join("a/shot.jpg"), 16, 16, &exif);
        let backend = MockBackend::with_dimensions(dims(&[(8192, 5464)]));

        let report =
            run_mock(tmp.path(), &backend, &MockRunner::default(), Platform::Generic).unwrap();

        let record = &report.records[0];
        assert_eq!(record.camera.as_deref(), Some("Canon EOS R5"));
        assert_eq!(record.date_taken.as_deref(), Some("2024-06-01T08:30:00.000Z"));
        assert_eq!(record.shutter_speed.as_deref(), Some("1/100s"));
        assert_eq!((record.width, record.height), (8192, 5464));
    }

    // =========================================================================
    // Fault isolation
    // =========================================================================

    #[test]
    fn failing_file_is_isolated() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a/1.jpg");
        touch(tmp.path(), "a/2.heic");
        touch(tmp.path(), "a/3.jpg");
        // 2.heic needs heif-convert, which the empty script reports as missing.
        let backend = MockBackend::with_dimensions(dims(&[(800, 600), (800, 600)]));

        let report =
            run_mock(tmp.path(), &backend, &MockRunner::default(), Platform::Generic).unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file_name, "2.heic");
        assert_eq!(report.failures[0].relative_path, "a/2.heic");
        assert!(report.failures[0].reason.contains("heif-convert"));
    }

    #[test]
    fn decode_failure_is_isolated() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a/1.jpg");
        touch(tmp.path(), "a/2.jpg");
        // Only one decode result: the second file fails
        let backend = MockBackend::with_dimensions(dims(&[(800, 600)]));

        let report =
            run_mock(tmp.path(), &backend, &MockRunner::default(), Platform::Generic).unwrap();

        assert_eq!(record_ids(&report.records), vec!["a-1"]);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("Decode failed"));
    }

    // =========================================================================
    // Events
    // =========================================================================

    #[test]
    fn events_report_each_file() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a/1.jpg");
        touch(tmp.path(), "a/2.cr2");
        let backend = MockBackend::with_dimensions(dims(&[(800, 600)]));
        let (tx, rx) = mpsc::channel();

        run_with(
            &backend,
            &MockRunner::default(),
            Platform::Generic,
            tmp.path(),
            &CatalogConfig::default(),
            &RunOptions::default(),
            Some(tx),
        )
        .unwrap();

        let events: Vec<ProcessEvent> = rx.iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            ProcessEvent::Processed {
                index: 1,
                total: 2,
                file_name: "1.jpg".into(),
                relative_path: "a/1.jpg".into(),
                camera: None,
                derivatives: vec![
                    DerivativeInfo {
                        kind: DerivativeKind::Thumbnail,
                        status: DerivativeStatus::Encoded
                    },
                    DerivativeInfo {
                        kind: DerivativeKind::Optimized,
                        status: DerivativeStatus::Original
                    },
                ],
            }
        );
        assert!(matches!(
            &events[1],
            ProcessEvent::Failed { index: 2, total: 2, file_name, .. } if file_name == "2.cr2"
        ));
    }

    // =========================================================================
    // Cache
    // =========================================================================

    #[test]
    fn second_run_hits_cache_and_skips_decode() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a/scan.tiff");

        let first = MockBackend::with_dimensions(dims(&[(3000, 2000)]));
        let report1 =
            run_mock(tmp.path(), &first, &MockRunner::default(), Platform::Generic).unwrap();
        assert_eq!(report1.cache.misses, 2);

        // No dimensions: any decode would fail the file
        let second = MockBackend::new();
        let report2 =
            run_mock(tmp.path(), &second, &MockRunner::default(), Platform::Generic).unwrap();

        assert!(second.get_operations().is_empty());
        assert_eq!(report2.cache.hits, 2);
        assert_eq!(report2.records, report1.records);
    }

    #[test]
    fn no_cache_option_reencodes() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a/1.jpg");

        let first = MockBackend::with_dimensions(dims(&[(800, 600)]));
        run_mock(tmp.path(), &first, &MockRunner::default(), Platform::Generic).unwrap();

        let second = MockBackend::with_dimensions(dims(&[(800, 600)]));
        let report = run_with(
            &second,
            &MockRunner::default(),
            Platform::Generic,
            tmp.path(),
            &CatalogConfig::default(),
            &RunOptions { use_cache: false },
            None,
        )
        .unwrap();

        assert_eq!(report.cache.hits, 0);
        assert_eq!(second.writes().len(), 1);
    }

    #[test]
    fn deleted_derivative_is_regenerated() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a/1.jpg");

        let first = MockBackend::with_dimensions(dims(&[(800, 600)]));
        run_mock(tmp.path(), &first, &MockRunner::default(), Platform::Generic).unwrap();
        std::fs::remove_file(tmp.path().join("public/thumbnails/a/1.jpg")).unwrap();

        let second = MockBackend::with_dimensions(dims(&[(800, 600)]));
        let report =
            run_mock(tmp.path(), &second, &MockRunner::default(), Platform::Generic).unwrap();
        assert_eq!(report.cache.misses, 1);
        assert!(tmp.path().join("public/thumbnails/a/1.jpg").exists());
    }

    #[test]
    fn stem_collisions_get_distinct_derivatives() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a/dawn.jpg");
        touch(tmp.path(), "a/dawn.png");
        let backend = MockBackend::with_dimensions(dims(&[(800, 600), (800, 600)]));

        let report =
            run_mock(tmp.path(), &backend, &MockRunner::default(), Platform::Generic).unwrap();

        let thumbs: HashSet<&str> = report
            .records
            .iter()
            .map(|r| r.thumbnail.as_str())
            .collect();
        assert_eq!(thumbs.len(), 2);
        assert!(thumbs.contains("/thumbnails/a/dawn-png.jpg"));
    }
}
