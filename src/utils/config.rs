//! Application configuration constants.
//! Tuning and defaults in one place.

use std::path::PathBuf;
use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    settings_filename: String,
    log_dir_name: String,
    log_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                settings_filename: format!(".{pkg}.toml"),
                log_dir_name: format!("{pkg}-logs"),
                log_filename: format!("{pkg}.log"),
            }
        })
    }

    /// Settings file looked up in the current directory (e.g. `.heicbatch.toml`).
    pub fn settings_filename(&self) -> &str {
        &self.settings_filename
    }

    pub fn log_filename(&self) -> &str {
        &self.log_filename
    }

    /// Default batch log: `<home>/<pkg>-logs/<pkg>.log`. None when no home directory is known.
    pub fn default_log_path(&self) -> Option<PathBuf> {
        let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?;
        Some(
            PathBuf::from(home)
                .join(&self.log_dir_name)
                .join(&self.log_filename),
        )
    }
}

// ---- Source format ----

/// Extensions (lowercase, no dot) treated as convertible sources.
pub const SOURCE_EXTENSIONS: [&str; 2] = ["heic", "heif"];

// ---- Defaults ----

/// Quality used when neither the settings file nor the CLI sets one.
pub const DEFAULT_QUALITY: u32 = 90;

// ---- Worker threads ----

/// Worker count limits.
/// Use [`WorkerThreadLimits::current()`] to fill `all_threads` from rayon; the rest are const.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    /// Ceiling on automatic worker count. Codec work is CPU-bound per task.
    pub max: usize,
    /// Minimum worker count.
    pub floor: usize,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            max: Self::MAX_WORKERS,
            floor: Self::FLOOR_WORKERS,
        }
    }
}

impl WorkerThreadLimits {
    pub const MAX_WORKERS: usize = 4;
    pub const FLOOR_WORKERS: usize = 1;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }

    /// min(available, ceiling), never below the floor.
    pub fn automatic(&self) -> usize {
        self.all_threads.min(self.max).max(self.floor)
    }
}

// ---- Output files ----

/// Suffix for in-progress output files; renamed away once the task succeeds.
pub const PARTIAL_SUFFIX: &str = "part";
