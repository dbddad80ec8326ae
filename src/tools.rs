//! Native command-line tool invocation.
//!
//! Formats the image library can't decode go through external tools
//! (`sips`, `heif-convert`, `exiftool`). Every invocation is a synchronous,
//! failure-prone call: a missing binary, a non-zero exit, or a timeout all
//! come back as a [`ToolError`] for the current file only.
//!
//! The [`ToolRunner`] trait is the seam: [`SystemRunner`] spawns real
//! processes, and tests substitute a scripted runner.
//!
//! Intermediate files live in a [`Scratch`] directory that is removed when
//! the value is dropped, so cleanup happens on every exit path.

use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

use crate::formats::{self, FormatTier};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Longest stderr excerpt carried in an error message.
const STDERR_EXCERPT: usize = 300;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{program} not found")]
    Missing { program: String },
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("{program} timed out after {secs}s")]
    TimedOut { program: String, secs: u64 },
    #[error("{program} produced no output")]
    EmptyOutput { program: String },
}

/// A program plus arguments, built up fluently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Last argument as a path (the output path for converters).
    pub fn last_path(&self) -> Option<&Path> {
        self.args.last().map(Path::new)
    }

    /// Shell-like rendering for logs.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

pub trait ToolRunner {
    /// Run to completion. Only a zero exit status is `Ok`.
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput, ToolError>;
}

/// Runs tools as child processes, optionally bounded by a timeout.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ToolRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput, ToolError> {
        debug!(command = %command.display(), "running tool");
        let program = command.program.clone();

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => ToolError::Missing {
                    program: program.clone(),
                },
                _ => ToolError::Spawn {
                    program: program.clone(),
                    source,
                },
            })?;

        // Drain both pipes concurrently so a chatty tool can't block on a
        // full pipe while we wait on it.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let waited = match self.timeout {
            Some(limit) => wait_with_deadline(&mut child, limit),
            None => child.wait().map(Some),
        };
        let status = waited.map_err(|source| ToolError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdout = collect(stdout);
        let stderr = collect(stderr);

        let Some(status) = status else {
            return Err(ToolError::TimedOut {
                program,
                secs: self.timeout.map(|t| t.as_secs()).unwrap_or_default(),
            });
        };

        if !status.success() {
            return Err(ToolError::Failed {
                program,
                status: status.to_string(),
                stderr: excerpt(&stderr),
            });
        }

        Ok(ToolOutput { stdout, stderr })
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// `Ok(None)` means the deadline passed and the child was killed.
fn wait_with_deadline(child: &mut Child, limit: Duration) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    match text.char_indices().nth(STDERR_EXCERPT) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

/// A per-file scratch directory, deleted on drop.
#[derive(Debug)]
pub struct Scratch {
    dir: tempfile::TempDir,
}

impl Scratch {
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("contact-sheet-")
            .tempdir()?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// The expected output if it exists, else the first web-safe raster the
    /// tool left in the directory (converters that split multi-image
    /// containers name their outputs themselves).
    pub fn produced(&self, expected: &Path) -> std::io::Result<Option<PathBuf>> {
        if expected.is_file() {
            return Ok(Some(expected.to_path_buf()));
        }
        let mut rasters: Vec<PathBuf> = std::fs::read_dir(self.dir.path())?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && formats::classify_path(p) == Some(FormatTier::WebSafe))
            .collect();
        rasters.sort();
        Ok(rasters.into_iter().next())
    }
}
