//! Path and naming utilities

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::types::OutputFormat;

/// `{output_dir}/{stem}.{ext}` for a converted file. Only the last extension is replaced.
pub fn converted_output_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let mut name: OsString = input.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(format.extension());
    output_dir.join(name)
}

/// `{output_dir}/{file_name}` for a passthrough file; name and extension kept verbatim.
pub fn passthrough_output_path(output_dir: &Path, input: &Path) -> PathBuf {
    output_dir.join(input.file_name().unwrap_or_default())
}

/// File name for log lines; falls back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// True if both paths resolve to the same existing file.
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
