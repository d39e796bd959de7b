//! Batch log handle: one line per task outcome and per batch-level error.
//!
//! Built by the caller and handed to [`BatchRunner`](crate::pipeline::BatchRunner). Every record
//! goes to the `log` facade; when a sink is open it is also appended to the log file as
//! `<timestamp> <LEVEL>:<message>`.

use anyhow::{Context, Result};
use log::Level;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

pub struct BatchLog {
    sink: Option<Mutex<File>>,
    path: Option<PathBuf>,
}

impl BatchLog {
    /// No log file; records still reach the `log` facade.
    pub fn disabled() -> Self {
        Self {
            sink: None,
            path: None,
        }
    }

    /// Open `path` for appending, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file {}", path.display()))?;
        Ok(Self {
            sink: Some(Mutex::new(file)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Path of the log file, if one is open.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, msg: &str) {
        self.record(Level::Info, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.record(Level::Warn, msg);
    }

    pub fn error(&self, msg: &str) {
        self.record(Level::Error, msg);
    }

    fn record(&self, level: Level, msg: &str) {
        log::log!(level, "{}", msg);
        let Some(sink) = &self.sink else {
            return;
        };
        let line = format!(
            "{} {}:{}",
            chrono::Local::now().format(TIMESTAMP_FORMAT),
            level,
            msg
        );
        // A poisoned lock only means another writer panicked mid-line; keep appending.
        let mut file = sink.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(file, "{}", line) {
            log::warn!("batch log write failed: {}", e);
        }
    }
}

impl Default for BatchLog {
    fn default() -> Self {
        Self::disabled()
    }
}
