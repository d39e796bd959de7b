use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::TaskId;
use crate::utils::config::PARTIAL_SUFFIX;

/// In-progress path for a task's output: hidden sibling of `final_path`, unique per task so two
/// tasks aiming at the same name never share a partial file.
pub fn partial_path_for(final_path: &Path, id: TaskId) -> PathBuf {
    let name = final_path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    final_path
        .parent()
        .unwrap_or(Path::new("."))
        .join(format!(".{name}.{}.{PARTIAL_SUFFIX}", id.0))
}

/// Remove a leftover partial file. Missing file is fine.
pub fn remove_partial(partial: &Path) {
    let _ = fs::remove_file(partial);
}

/// Write `bytes` to the partial path, flush, then rename onto `final_path`.
/// The partial file is removed on any failure; the file handle is closed before the rename.
pub fn write_atomically(final_path: &Path, id: TaskId, bytes: &[u8]) -> Result<()> {
    let partial = partial_path_for(final_path, id);
    let written = (|| -> Result<()> {
        let mut file = fs::File::create(&partial)
            .with_context(|| format!("create {}", partial.display()))?;
        file.write_all(bytes)
            .with_context(|| format!("write {}", partial.display()))?;
        file.flush()?;
        Ok(())
    })();
    if let Err(e) = written {
        remove_partial(&partial);
        return Err(e);
    }
    rename_partial_to_final(&partial, final_path)
}

pub fn rename_partial_to_final(partial: &Path, final_path: &Path) -> Result<()> {
    fs::rename(partial, final_path)
        .with_context(|| {
            format!(
                "rename partial output into place ({} -> {})",
                partial.display(),
                final_path.display()
            )
        })
        .inspect_err(|_| remove_partial(partial))
}
