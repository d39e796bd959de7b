use clap::Parser;
use std::path::PathBuf;

use crate::utils::config::PackagePaths;
use crate::utils::settings_file::CliSettings;

/// Batch-convert HEIC/HEIF images to PNG, JPEG or WEBP; other files are copied through.
#[derive(Clone, Parser)]
#[command(name = "heicbatch")]
#[command(
    about = "Convert every HEIC/HEIF file in INPUT_DIR into OUTPUT_DIR; copy everything else as is."
)]
pub struct Cli {
    /// Directory to read (non-recursive).
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory to write into. Created if missing.
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Quality 1-100. JPEG/WEBP encoder quality; for PNG, higher means less compression.
    /// Default: 90.
    #[arg(long, short = 'q', value_parser = clap::value_parser!(u32))]
    pub quality: Option<u32>,

    /// Output format: png, jpg/jpeg or webp. Default: png.
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Worker threads. Default: min(available cores, 4).
    #[arg(long = "workers", short = 'j', value_parser = clap::value_parser!(usize))]
    pub max_workers: Option<usize>,

    /// Settings file. Default: `.heicbatch.toml` in the current directory, if present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Append the batch log here. Default: `~/heicbatch-logs/heicbatch.log`.
    #[arg(long, value_name = "FILE", conflicts_with = "no_log_file")]
    pub log_file: Option<PathBuf>,

    /// Do not write a batch log file (console logging only).
    #[arg(long)]
    pub no_log_file: bool,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Print the batch result as JSON instead of the colored summary.
    #[arg(long)]
    pub json: bool,

    /// Exit non-zero when any file failed.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub fail_on_error: Option<bool>,
}

impl Cli {
    /// Overlay flags given on the command line onto `settings` (defaults + settings file).
    pub fn apply_to_settings(&self, settings: &mut CliSettings) {
        if let Some(q) = self.quality {
            settings.quality = Some(q);
        }
        if let Some(ref f) = self.format {
            settings.format = Some(f.clone());
        }
        if let Some(n) = self.max_workers {
            settings.max_workers = Some(n);
        }
        if let Some(ref p) = self.log_file {
            settings.log_file = Some(p.clone());
        }
        if let Some(v) = self.verbose {
            settings.verbose = v;
        }
        if let Some(v) = self.fail_on_error {
            settings.fail_on_error = v;
        }
    }

    /// Log file to open, or None when disabled or no home directory is known.
    pub fn log_path(&self, settings: &CliSettings) -> Option<PathBuf> {
        if self.no_log_file {
            return None;
        }
        settings
            .log_file
            .clone()
            .or_else(|| PackagePaths::get().default_log_path())
    }
}
