//! Error taxonomy for a batch run.
//!
//! Batch-level errors ([`ConfigError`], [`SetupError`]) stop the batch before any worker starts.
//! Per-task errors ([`TaskError`]) are recorded in the task's outcome and never leave the task.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid batch configuration. Surfaced to the caller before any work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid quality {0}: expected an integer between 1 and 100")]
    InvalidQuality(u32),

    #[error("unsupported output format '{0}': expected png, jpg, jpeg or webp")]
    UnsupportedFormat(String),

    #[error("invalid worker count {0}: expected at least 1")]
    InvalidWorkerCount(usize),

    #[error("input directory '{}' is not usable: {reason}", path.display())]
    InvalidInputDir { path: PathBuf, reason: String },
}

/// Failure while preparing the batch (output directory, directory scan).
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("cannot create output directory '{}': {source}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read input directory '{}': {source}", path.display())]
    ScanInputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error returned by [`run_batch`](crate::run_batch) when the batch never started.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Why a single task failed. Carried in [`TaskOutcome`](crate::TaskOutcome) and in the final
/// error list.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum TaskError {
    /// Source file unreadable, corrupt or in a format the decoder does not handle.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The decoded image could not be encoded in the target format.
    #[error("encode failed: {0}")]
    Encode(String),

    /// The encoded image could not be written to the output directory.
    #[error("write failed: {0}")]
    Write(String),

    /// Passthrough copy failed.
    #[error("copy failed: {0}")]
    Copy(String),

    /// Never started; cancellation was requested before a worker picked it up.
    #[error("cancelled before start")]
    Cancelled,

    /// The codec panicked while handling this file.
    #[error("worker panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }

    pub fn copy(message: impl Into<String>) -> Self {
        Self::Copy(message.into())
    }

    /// Short label used in summaries and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Decode(_) => "DecodeError",
            Self::Encode(_) => "EncodeError",
            Self::Write(_) => "WriteError",
            Self::Copy(_) => "CopyError",
            Self::Cancelled => "Cancelled",
            Self::Panicked(_) => "Panic",
        }
    }
}
