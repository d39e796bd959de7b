//! Public and internal types for the heicbatch API and pipeline.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ConfigError, TaskError};
use crate::utils::config::{DEFAULT_QUALITY, SOURCE_EXTENSIONS};

/// Target raster format for converted files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    /// Lowercase extension used for converted file names.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }

    /// Uppercase name used in log lines.
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Webp => "WEBP",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::Webp),
            _ => Err(ConfigError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source container, derived from the file extension. Handed to the decoder as a hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Heic,
    Heif,
}

impl SourceFormat {
    /// Match the end of the file name (case-insensitive) against the known source extensions.
    /// A bare `.heic` counts too, even though it has no `Path::extension`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        let ext = SOURCE_EXTENSIONS
            .iter()
            .find(|ext| name.strip_suffix(**ext).is_some_and(|rest| rest.ends_with('.')))?;
        match *ext {
            "heif" => Some(SourceFormat::Heif),
            _ => Some(SourceFormat::Heic),
        }
    }
}

/// One source image to decode, re-encode and write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub source_format: SourceFormat,
    /// 1..=100, already validated.
    pub quality: u32,
    pub output_format: OutputFormat,
}

/// One file to copy through byte-for-byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

/// Unit of work handed to the executor. Built by the classifier, consumed once by a worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    Convert(ConversionRequest),
    Copy(CopyRequest),
}

impl Task {
    pub fn input_path(&self) -> &Path {
        match self {
            Task::Convert(req) => &req.input_path,
            Task::Copy(req) => &req.input_path,
        }
    }

    pub fn output_path(&self) -> &Path {
        match self {
            Task::Convert(req) => &req.output_path,
            Task::Copy(req) => &req.output_path,
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Convert(_) => TaskKind::Convert,
            Task::Copy(_) => TaskKind::Copy,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Convert,
    Copy,
}

/// Submission index of a task within its batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TaskId(pub usize);

/// Result of one task. Exactly one per submitted task.
#[derive(Clone, Debug)]
pub struct TaskOutcome {
    pub id: TaskId,
    pub kind: TaskKind,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub success: bool,
    pub error: Option<TaskError>,
}

impl TaskOutcome {
    pub fn succeeded(id: TaskId, task: &Task) -> Self {
        Self {
            id,
            kind: task.kind(),
            input_path: task.input_path().to_path_buf(),
            output_path: task.output_path().to_path_buf(),
            success: true,
            error: None,
        }
    }

    pub fn failed(id: TaskId, task: &Task, error: TaskError) -> Self {
        Self {
            id,
            kind: task.kind(),
            input_path: task.input_path().to_path_buf(),
            output_path: task.output_path().to_path_buf(),
            success: false,
            error: Some(error),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.error, Some(TaskError::Cancelled))
    }
}

/// Progress report handed to the observer: `completed` of `total` tasks finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub completed: i64,
    pub total: i64,
}

impl ProgressSnapshot {
    /// Sentinel for a batch that failed before any task ran. Ends progress reporting.
    pub const FAILED: ProgressSnapshot = ProgressSnapshot {
        completed: -1,
        total: -1,
    };

    pub fn new(completed: usize, total: usize) -> Self {
        Self {
            completed: completed as i64,
            total: total as i64,
        }
    }

    pub fn is_failure(&self) -> bool {
        *self == Self::FAILED
    }
}

/// Batch configuration supplied by the caller. Checked once by [`BatchConfig::validate`].
#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// 1..=100. JPEG/WEBP encoder quality; PNG compression intensity.
    pub quality: u32,
    pub output_format: OutputFormat,
    /// Override worker count. When None, min(available parallelism, 4).
    pub max_workers: Option<usize>,
}

impl BatchConfig {
    /// Config with default quality (90), PNG output and automatic worker count.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            quality: DEFAULT_QUALITY,
            output_format: OutputFormat::default(),
            max_workers: None,
        }
    }

    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    /// Quality and worker count are checked before the input directory is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::InvalidQuality(self.quality));
        }
        if let Some(0) = self.max_workers {
            return Err(ConfigError::InvalidWorkerCount(0));
        }
        let meta = std::fs::metadata(&self.input_dir).map_err(|e| ConfigError::InvalidInputDir {
            path: self.input_dir.clone(),
            reason: e.to_string(),
        })?;
        if !meta.is_dir() {
            return Err(ConfigError::InvalidInputDir {
                path: self.input_dir.clone(),
                reason: "not a directory".to_string(),
            });
        }
        std::fs::read_dir(&self.input_dir).map_err(|e| ConfigError::InvalidInputDir {
            path: self.input_dir.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

/// A failed task in the final report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub input_path: PathBuf,
    pub error: TaskError,
}

/// Final counts for a batch. `total == succeeded + failed + cancelled`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Failed tasks in submission order. Cancelled tasks are counted, not listed.
    pub errors: Vec<FailedFile>,
}

impl BatchResult {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
