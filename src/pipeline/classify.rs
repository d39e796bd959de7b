//! Directory scan: list the input directory's immediate children and split them into convert and
//! passthrough tasks.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::engine::tools::{converted_output_path, passthrough_output_path};
use crate::error::SetupError;
use crate::types::{BatchConfig, ConversionRequest, CopyRequest, SourceFormat, Task};

/// One result from the directory listing: a path to consider, or an error for a child entry.
pub enum WalkOutcome {
    Ok(PathBuf),
    Err { msg: String, path: Option<PathBuf> },
}

/// Classifier output: convert tasks and passthrough tasks, each sorted by file name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskPlan {
    pub convert: Vec<Task>,
    pub copy: Vec<Task>,
}

impl TaskPlan {
    pub fn total(&self) -> usize {
        self.convert.len() + self.copy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Submission order: all convert tasks, then all copy tasks.
    pub fn into_tasks(self) -> Vec<Task> {
        let mut tasks = self.convert;
        tasks.extend(self.copy);
        tasks
    }
}

/// Build the task for a single file.
pub fn classify_file(path: &Path, config: &BatchConfig) -> Task {
    match SourceFormat::from_path(path) {
        Some(source_format) => Task::Convert(ConversionRequest {
            input_path: path.to_path_buf(),
            output_path: converted_output_path(&config.output_dir, path, config.output_format),
            source_format,
            quality: config.quality,
            output_format: config.output_format,
        }),
        None => Task::Copy(CopyRequest {
            input_path: path.to_path_buf(),
            output_path: passthrough_output_path(&config.output_dir, path),
        }),
    }
}

fn list_children(dir: &Path) -> Result<Vec<WalkOutcome>, SetupError> {
    let mut outcomes = Vec::new();
    for r in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        match r {
            Ok(entry) => outcomes.push(WalkOutcome::Ok(entry.into_path())),
            // Depth 0 is the directory itself: nothing can be listed.
            Err(err) if err.depth() == 0 => {
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory loop"));
                return Err(SetupError::ScanInputDir {
                    path: dir.to_path_buf(),
                    source,
                });
            }
            Err(err) => outcomes.push(WalkOutcome::Err {
                msg: err.to_string(),
                path: err.path().map(PathBuf::from),
            }),
        }
    }
    Ok(outcomes)
}

/// Scan `config.input_dir` (non-recursive) and classify every regular file.
/// Directories and other non-file entries are skipped silently; symlinks to files count as files.
pub fn classify_dir(config: &BatchConfig) -> Result<TaskPlan, SetupError> {
    let mut plan = TaskPlan::default();
    for outcome in list_children(&config.input_dir)? {
        match outcome {
            WalkOutcome::Ok(path) => {
                if !path.is_file() {
                    continue;
                }
                match classify_file(&path, config) {
                    task @ Task::Convert(_) => plan.convert.push(task),
                    task @ Task::Copy(_) => plan.copy.push(task),
                }
            }
            WalkOutcome::Err { msg, path } => {
                log::warn!(
                    "Skipping unreadable entry {}: {}",
                    path.as_deref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<unknown>".to_string()),
                    msg
                );
            }
        }
    }
    log::debug!(
        "Classified {} convert and {} passthrough tasks in {}",
        plan.convert.len(),
        plan.copy.len(),
        config.input_dir.display()
    );
    Ok(plan)
}
