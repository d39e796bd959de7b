//! Batch pipeline: classify, execute on a worker pool, aggregate progress, summarize.

pub mod aggregator;
pub mod classify;
pub mod context;
pub mod error_handler;
pub mod executor;
pub mod orchestrator;

pub use aggregator::ProgressAggregator;
pub use classify::{TaskPlan, WalkOutcome, classify_dir, classify_file};
pub use context::{PipelineChannels, PipelineTuning, WorkerContext, create_pipeline_channels};
pub use error_handler::{OutcomeTally, log_batch_summary};
pub use executor::{Executor, spawn_workers};
pub use orchestrator::{BatchRunner, run_batch};
