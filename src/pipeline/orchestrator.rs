use log::debug;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::engine::codec::{SourceDecoder, default_decoder};
use crate::error::{BatchError, SetupError};
use crate::pipeline;
use crate::pipeline::aggregator::ProgressAggregator;
use crate::pipeline::executor::Executor;
use crate::types::{BatchConfig, BatchResult, ProgressSnapshot};
use crate::utils::BatchLog;

/// Runs one batch: validate, create the output directory, classify, execute.
///
/// Built with defaults (platform decoder, log facade only, no cancellation) and adjusted with the
/// builder methods before [`BatchRunner::run`].
pub struct BatchRunner {
    config: BatchConfig,
    decoder: Arc<dyn SourceDecoder>,
    batch_log: Arc<BatchLog>,
    cancel: Option<Arc<AtomicBool>>,
}

impl BatchRunner {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            decoder: default_decoder(),
            batch_log: Arc::new(BatchLog::disabled()),
            cancel: None,
        }
    }

    /// Replace the source decoder.
    pub fn decoder(mut self, decoder: Arc<dyn SourceDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn batch_log(mut self, batch_log: Arc<BatchLog>) -> Self {
        self.batch_log = batch_log;
        self
    }

    /// Workers stop starting new tasks once this flag is set; running tasks finish.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Run the batch, reporting progress to `on_progress` on the calling thread.
    ///
    /// - Invalid config: `Err(BatchError::Config)`, no snapshot, no file I/O.
    /// - Setup failure: sentinel snapshot `{-1, -1}`, then `Err(BatchError::Setup)`.
    /// - No files: one `{0, 0}` snapshot and an all-zero result; no workers are started.
    /// - Otherwise `{0, total}` followed by one snapshot per finished task.
    pub fn run<F>(&self, on_progress: F) -> Result<BatchResult, BatchError>
    where
        F: FnMut(ProgressSnapshot),
    {
        if let Err(e) = self.config.validate() {
            self.batch_log.error(&format!("Invalid batch configuration: {}", e));
            return Err(e.into());
        }
        debug!(
            "{} CONFIG:{:#?}",
            env!("CARGO_PKG_NAME").to_uppercase(),
            self.config
        );

        let aggregator = ProgressAggregator::new(0, on_progress);
        let plan = match self.prepare() {
            Ok(plan) => plan,
            Err(e) => {
                self.batch_log.error(&format!("Batch setup failed: {}", e));
                aggregator.fail();
                return Err(e.into());
            }
        };

        let total = plan.total();
        let aggregator = ProgressAggregator::new(total, aggregator.into_observer());
        aggregator.start();
        if plan.is_empty() {
            self.batch_log.info(&format!(
                "No files found in {}.",
                self.config.input_dir.display()
            ));
            return Ok(BatchResult::default());
        }

        let tuning = pipeline::PipelineTuning::for_batch(self.config.max_workers, total);
        let ctx = pipeline::WorkerContext {
            decoder: Arc::clone(&self.decoder),
            batch_log: Arc::clone(&self.batch_log),
            cancel: self.cancel.clone(),
        };
        let executor = Executor::new(tuning, ctx);
        self.batch_log.info(&format!(
            "Processing {} file(s) from {} into {} as {} (quality {}, {} workers).",
            total,
            self.config.input_dir.display(),
            self.config.output_dir.display(),
            self.config.output_format,
            self.config.quality,
            executor.num_workers()
        ));

        let mut tally = pipeline::OutcomeTally::new();
        executor.run(plan.into_tasks(), |outcome| {
            tally.record(&outcome);
            aggregator.on_outcome(&outcome);
        });

        let result = tally.into_result(total);
        pipeline::log_batch_summary(&result, &self.batch_log);
        Ok(result)
    }

    /// Output directory first, then the scan, so nothing is classified against a missing target.
    fn prepare(&self) -> Result<pipeline::TaskPlan, SetupError> {
        fs::create_dir_all(&self.config.output_dir).map_err(|source| {
            SetupError::CreateOutputDir {
                path: self.config.output_dir.clone(),
                source,
            }
        })?;
        pipeline::classify_dir(&self.config)
    }
}

/// Run a batch with the default decoder and no log file.
pub fn run_batch<F>(config: BatchConfig, on_progress: F) -> Result<BatchResult, BatchError>
where
    F: FnMut(ProgressSnapshot),
{
    BatchRunner::new(config).run(on_progress)
}
