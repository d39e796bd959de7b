//! Per-task work: decode + encode + write for convert tasks, metadata-preserving copy for the rest.
//! Each function opens at most one input and one output file and closes both before returning.

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::Path;

use crate::engine::codec::{self, SourceDecoder};
use crate::engine::tools::{display_name, is_same_file};
use crate::error::TaskError;
use crate::types::{ConversionRequest, CopyRequest, Task, TaskId, TaskOutcome};
use crate::utils::BatchLog;
use crate::utils::tempfiles::{
    partial_path_for, remove_partial, rename_partial_to_final, write_atomically,
};

/// Run one task to completion and log its outcome. Errors never leave this function.
pub fn run_task(
    id: TaskId,
    task: &Task,
    decoder: &dyn SourceDecoder,
    batch_log: &BatchLog,
) -> TaskOutcome {
    let result = match task {
        Task::Convert(req) => convert_file(id, req, decoder),
        Task::Copy(req) => copy_file(id, req),
    };
    let outcome = match result {
        Ok(()) => TaskOutcome::succeeded(id, task),
        Err(e) => TaskOutcome::failed(id, task, e),
    };
    log_outcome(task, &outcome, batch_log);
    outcome
}

/// Read, decode, encode, then write through a partial file.
pub fn convert_file(
    id: TaskId,
    req: &ConversionRequest,
    decoder: &dyn SourceDecoder,
) -> Result<(), TaskError> {
    let bytes = fs::read(&req.input_path)
        .map_err(|e| TaskError::decode(format!("read {}: {}", req.input_path.display(), e)))?;
    let img = decoder.decode(&bytes, req.source_format)?;
    drop(bytes);
    let encoded = codec::encode(&img, req.output_format, req.quality)?;
    drop(img);
    write_atomically(&req.output_path, id, &encoded)
        .map_err(|e| TaskError::Write(format!("{e:#}")))
}

/// Byte-for-byte copy keeping permissions and timestamps where the platform allows.
pub fn copy_file(id: TaskId, req: &CopyRequest) -> Result<(), TaskError> {
    if is_same_file(&req.input_path, &req.output_path) {
        return Err(TaskError::copy(format!(
            "{} would be copied onto itself",
            req.input_path.display()
        )));
    }
    let partial = partial_path_for(&req.output_path, id);
    if let Err(e) = fs::copy(&req.input_path, &partial) {
        remove_partial(&partial);
        return Err(TaskError::copy(format!(
            "{} -> {}: {}",
            req.input_path.display(),
            req.output_path.display(),
            e
        )));
    }
    if let Err(e) = preserve_times(&req.input_path, &partial) {
        log::debug!(
            "could not preserve timestamps for {}: {}",
            req.output_path.display(),
            e
        );
    }
    rename_partial_to_final(&partial, &req.output_path)
        .map_err(|e| TaskError::copy(format!("{e:#}")))
}

/// Copy access and modification times from `src` onto `dst`.
fn preserve_times(src: &Path, dst: &Path) -> io::Result<()> {
    let meta = fs::metadata(src)?;
    let mut times = FileTimes::new().set_modified(meta.modified()?);
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    // fs::copy already carried the permissions; a read-only copy takes times via a read handle.
    let file = File::options()
        .write(true)
        .open(dst)
        .or_else(|_| File::open(dst))?;
    file.set_times(times)
}

fn log_outcome(task: &Task, outcome: &TaskOutcome, batch_log: &BatchLog) {
    match (task, &outcome.error) {
        (Task::Convert(req), None) => batch_log.info(&format!(
            "Converted {} to {} at '{}'.",
            display_name(&req.input_path),
            req.output_format,
            req.output_path.display()
        )),
        (Task::Copy(req), None) => batch_log.info(&format!(
            "Copied {} to output directory.",
            display_name(&req.input_path)
        )),
        (Task::Convert(req), Some(e)) => batch_log.error(&format!(
            "Failed to convert {}: {}",
            req.input_path.display(),
            e
        )),
        (Task::Copy(req), Some(e)) => batch_log.error(&format!(
            "Failed to copy {}: {}",
            req.input_path.display(),
            e
        )),
    }
}
