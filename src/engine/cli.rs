//! CLI command handler: merge settings, run the batch behind a progress bar, print the summary.

use anyhow::{Context, Result, bail};
use kdam::Animation;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::arg_parser::Cli;
use crate::engine::progress::{ProgressBarConfig, bar_observer, create_progress_bar, finish_bar};
use crate::error::BatchError;
use crate::pipeline::BatchRunner;
use crate::types::{BatchConfig, BatchResult, OutputFormat};
use crate::utils::{
    BatchLog, CliSettings, Colors, apply_file_to_settings, load_settings_file, setup_logging,
};

/// Defaults, then the settings file, then command-line flags.
pub fn resolve_settings(cli: &Cli) -> Result<CliSettings> {
    let cwd = std::env::current_dir().context("resolve current directory")?;
    let mut settings = CliSettings::default();
    if let Some(file) = load_settings_file(cli.config.as_deref(), &cwd)? {
        apply_file_to_settings(&file, &mut settings);
    }
    cli.apply_to_settings(&mut settings);
    Ok(settings)
}

/// Library config from the positional directories and merged settings.
/// Validation happens in the runner.
pub fn build_config(cli: &Cli, settings: &CliSettings) -> Result<BatchConfig> {
    let mut config = BatchConfig::new(&cli.input_dir, &cli.output_dir);
    if let Some(q) = settings.quality {
        config = config.with_quality(q);
    }
    if let Some(ref f) = settings.format {
        config = config.with_format(f.parse::<OutputFormat>()?);
    }
    config.max_workers = settings.max_workers;
    Ok(config)
}

/// Open the batch log; a log file that cannot be opened downgrades to console-only logging.
fn open_batch_log(path: Option<PathBuf>) -> BatchLog {
    let Some(path) = path else {
        return BatchLog::disabled();
    };
    match BatchLog::open(&path) {
        Ok(batch_log) => {
            debug!("Batch log: {}", path.display());
            batch_log
        }
        Err(e) => {
            warn!("Batch log disabled: {:#}", e);
            BatchLog::disabled()
        }
    }
}

fn install_cancel_handler() -> Result<Arc<AtomicBool>> {
    let cancel_requested = Arc::new(AtomicBool::new(false));
    let cancel_requested_handler = Arc::clone(&cancel_requested);
    ctrlc::set_handler(move || {
        if !cancel_requested_handler.swap(true, Ordering::Relaxed) {
            eprintln!();
            warn!("Cancelling: files already in progress will finish.");
        }
    })
    .context("set Ctrl+C handler")?;
    Ok(cancel_requested)
}

fn log_location(batch_log: &BatchLog) -> String {
    batch_log
        .path()
        .map(|p: &Path| p.display().to_string())
        .unwrap_or_else(|| "the console output above".to_string())
}

fn print_summary(result: &BatchResult) {
    println!(
        "{} | {} | {}",
        Colors::colorize(Colors::SUCCEEDED, &format!("Succeeded: {}", result.succeeded)),
        Colors::colorize(Colors::FAILED, &format!("Failed: {}", result.failed)),
        Colors::colorize(Colors::CANCELLED, &format!("Cancelled: {}", result.cancelled))
    );
    for failed in &result.errors {
        println!(
            "  {} {}: {}",
            Colors::colorize(Colors::FAILED, failed.error.label()),
            failed.input_path.display(),
            failed.error
        );
    }
}

/// Run one batch from the command line. Per-file failures are reported, not returned, unless
/// `fail_on_error` is set.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let settings = resolve_settings(cli)?;
    setup_logging(settings.verbose);
    let config = build_config(cli, &settings)?;
    let batch_log = Arc::new(open_batch_log(cli.log_path(&settings)));
    let cancel = install_cancel_handler()?;

    let bar = (!cli.json)
        .then(|| create_progress_bar(ProgressBarConfig::new(0, "Converting", Animation::Classic)));
    let mut observer = bar.as_ref().map(bar_observer);
    let mut setup_failed = false;

    let outcome = BatchRunner::new(config)
        .batch_log(Arc::clone(&batch_log))
        .cancel_flag(Arc::clone(&cancel))
        .run(|snapshot| {
            if snapshot.is_failure() {
                setup_failed = true;
            }
            if let Some(update) = observer.as_mut() {
                update(snapshot);
            }
        });
    if let Some(ref bar) = bar {
        finish_bar(bar);
    }

    let result = match outcome {
        Ok(result) => result,
        Err(e @ BatchError::Setup(_)) if setup_failed => {
            return Err(anyhow::Error::new(e)).with_context(|| {
                format!(
                    "batch stopped before any file was processed; details in {}",
                    log_location(&batch_log)
                )
            });
        }
        Err(e) => return Err(e.into()),
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("serialize batch result")?
        );
    } else {
        print_summary(&result);
    }

    if cancel.load(Ordering::Relaxed) && result.cancelled > 0 {
        bail!("cancelled: {} file(s) were not processed", result.cancelled);
    }
    if settings.fail_on_error && result.has_failures() {
        bail!(
            "{} of {} file(s) failed; details in {}",
            result.failed,
            result.total,
            log_location(&batch_log)
        );
    }
    Ok(())
}
