//! Pipeline context and tuning: shared data handed to every worker and the derived worker count.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::codec::SourceDecoder;
use crate::types::{Task, TaskId, TaskOutcome};
use crate::utils::BatchLog;
use crate::utils::config::WorkerThreadLimits;

/// Worker count and channel capacity for one batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineTuning {
    pub num_workers: usize,
    /// Capacity for task and outcome channels. Equal to the task count so no send blocks.
    pub channel_cap: usize,
}

impl PipelineTuning {
    /// `requested` overrides the automatic count (min(available, 4)). Capped at the task count.
    pub fn for_batch(requested: Option<usize>, task_count: usize) -> Self {
        Self::with_limits(requested, task_count, WorkerThreadLimits::current())
    }

    pub fn with_limits(
        requested: Option<usize>,
        task_count: usize,
        limits: WorkerThreadLimits,
    ) -> Self {
        let wanted = requested.unwrap_or_else(|| limits.automatic());
        Self {
            num_workers: wanted.min(task_count).max(limits.floor),
            channel_cap: task_count.max(1),
        }
    }
}

/// Shared, read-only context for every worker.
#[derive(Clone)]
pub struct WorkerContext {
    pub decoder: Arc<dyn SourceDecoder>,
    pub batch_log: Arc<BatchLog>,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl WorkerContext {
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Task channel (orchestrator → workers) and outcome channel (workers → orchestrator).
pub struct PipelineChannels {
    pub task_tx: Sender<(TaskId, Task)>,
    pub task_rx: Receiver<(TaskId, Task)>,
    pub outcome_tx: Sender<TaskOutcome>,
    pub outcome_rx: Receiver<TaskOutcome>,
}

pub fn create_pipeline_channels(tuning: &PipelineTuning) -> PipelineChannels {
    let (task_tx, task_rx) = bounded::<(TaskId, Task)>(tuning.channel_cap);
    let (outcome_tx, outcome_rx) = bounded::<TaskOutcome>(tuning.channel_cap);
    PipelineChannels {
        task_tx,
        task_rx,
        outcome_tx,
        outcome_rx,
    }
}
