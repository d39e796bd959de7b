//! Bounded worker pool. Workers pull one task at a time, run it behind a panic boundary and send
//! exactly one outcome per task back in completion order.

use crossbeam_channel::{Receiver, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crate::engine::convert::run_task;
use crate::engine::tools::display_name;
use crate::error::TaskError;
use crate::types::{Task, TaskId, TaskOutcome};
use crate::utils::tempfiles::{partial_path_for, remove_partial};

use super::context::{PipelineTuning, WorkerContext, create_pipeline_channels};

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run one task; a panic in the codec becomes a failed outcome for this task only.
fn run_isolated(id: TaskId, task: &Task, ctx: &WorkerContext) -> TaskOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        run_task(id, task, ctx.decoder.as_ref(), &ctx.batch_log)
    })) {
        Ok(outcome) => outcome,
        Err(payload) => {
            remove_partial(&partial_path_for(task.output_path(), id));
            let error = TaskError::Panicked(panic_message(payload.as_ref()));
            ctx.batch_log.error(&format!(
                "Failed to process {}: {}",
                task.input_path().display(),
                error
            ));
            TaskOutcome::failed(id, task, error)
        }
    }
}

/// Single worker: pull tasks until the channel closes. Cancellation is checked between tasks.
fn worker_loop(
    task_rx: Receiver<(TaskId, Task)>,
    outcome_tx: Sender<TaskOutcome>,
    ctx: WorkerContext,
) {
    while let Ok((id, task)) = task_rx.recv() {
        let outcome = if ctx.is_cancelled() {
            ctx.batch_log.warn(&format!(
                "Skipped {}: batch cancelled",
                display_name(task.input_path())
            ));
            TaskOutcome::failed(id, &task, TaskError::Cancelled)
        } else {
            run_isolated(id, &task, &ctx)
        };
        if outcome_tx.send(outcome).is_err() {
            break;
        }
    }
    drop(outcome_tx);
}

/// Spawn workers reading from `task_rx`. Caller must drop its own `outcome_tx` afterwards so the
/// outcome channel closes when the last worker exits.
pub fn spawn_workers(
    task_rx: Receiver<(TaskId, Task)>,
    outcome_tx: &Sender<TaskOutcome>,
    ctx: &WorkerContext,
    num_workers: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_workers)
        .map(|_| {
            let task_rx = task_rx.clone();
            let outcome_tx = outcome_tx.clone();
            let ctx = ctx.clone();
            thread::spawn(move || worker_loop(task_rx, outcome_tx, ctx))
        })
        .collect()
}

/// Runs a task list on a fixed pool of worker threads.
pub struct Executor {
    tuning: PipelineTuning,
    ctx: WorkerContext,
}

impl Executor {
    pub fn new(tuning: PipelineTuning, ctx: WorkerContext) -> Self {
        Self { tuning, ctx }
    }

    pub fn num_workers(&self) -> usize {
        self.tuning.num_workers
    }

    /// Submit every task, call `on_outcome` on this thread for each outcome as it arrives, and
    /// return once all workers have exited. Returns the number of outcomes delivered.
    pub fn run<F>(&self, tasks: Vec<Task>, mut on_outcome: F) -> usize
    where
        F: FnMut(TaskOutcome),
    {
        let submitted = tasks.len();
        let channels = create_pipeline_channels(&self.tuning);

        for (i, task) in tasks.into_iter().enumerate() {
            // Capacity equals the task count and the receiver is alive: never blocks or fails.
            if channels.task_tx.send((TaskId(i), task)).is_err() {
                break;
            }
        }
        // Closing the task channel lets workers exit once it drains.
        drop(channels.task_tx);

        let worker_handles = spawn_workers(
            channels.task_rx,
            &channels.outcome_tx,
            &self.ctx,
            self.tuning.num_workers,
        );
        drop(channels.outcome_tx);
        log::debug!(
            "executor: {} tasks on {} workers",
            submitted,
            worker_handles.len()
        );

        let mut delivered = 0_usize;
        while let Ok(outcome) = channels.outcome_rx.recv() {
            delivered += 1;
            on_outcome(outcome);
        }
        for h in worker_handles {
            if h.join().is_err() {
                log::error!("executor: worker thread panicked outside a task");
            }
        }
        if delivered != submitted {
            log::error!(
                "executor: {} tasks submitted but {} outcomes delivered",
                submitted,
                delivered
            );
        }
        delivered
    }
}
