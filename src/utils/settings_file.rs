//! Load `.heicbatch.toml` (CLI only). The lib does not use this; library callers build a
//! [`BatchConfig`](crate::BatchConfig) directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    quality: Option<u32>,
    format: Option<String>,
    max_workers: Option<usize>,
    log_file: Option<String>,
    verbose: Option<bool>,
    fail_on_error: Option<bool>,
}

/// Effective CLI settings after defaults and the settings file are merged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliSettings {
    pub quality: Option<u32>,
    pub format: Option<String>,
    pub max_workers: Option<usize>,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
    pub fail_on_error: bool,
}

/// Parse a settings file body. Unknown keys are rejected so typos surface.
pub fn parse_settings(body: &str) -> std::result::Result<SettingsFile, toml::de::Error> {
    toml::from_str(body)
}

/// Load `explicit` if given, else `.heicbatch.toml` in `dir` if present.
/// A missing default file is `Ok(None)`; a missing explicit file or a malformed one is an error.
pub fn load_settings_file(explicit: Option<&Path>, dir: &Path) -> Result<Option<SettingsFile>> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => dir.join(PackagePaths::get().settings_filename()),
    };
    if explicit.is_none() && !path.is_file() {
        return Ok(None);
    }
    let body = std::fs::read_to_string(&path)
        .with_context(|| format!("read settings file {}", path.display()))?;
    let file = parse_settings(&body)
        .with_context(|| format!("parse settings file {}", path.display()))?;
    Ok(Some(file))
}

/// Overwrite settings field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $out:expr, $field:ident) => {
        if let Some(v) = $sec.$field.clone() {
            $out.$field = v;
        }
    };
}

/// Apply file values (only the ones present) on top of `settings`. Call before applying CLI flags.
pub fn apply_file_to_settings(file: &SettingsFile, settings: &mut CliSettings) {
    let sec = &file.settings;
    if let Some(q) = sec.quality {
        settings.quality = Some(q);
    }
    if let Some(ref f) = sec.format {
        settings.format = Some(f.clone());
    }
    if let Some(n) = sec.max_workers {
        settings.max_workers = Some(n);
    }
    if let Some(ref p) = sec.log_file {
        settings.log_file = Some(PathBuf::from(p));
    }
    apply_file_opt!(sec, settings, verbose);
    apply_file_opt!(sec, settings, fail_on_error);
}
