use crate::types::{BatchResult, FailedFile, TaskId, TaskOutcome};
use crate::utils::BatchLog;

/// Collects outcomes as they arrive (completion order) and builds the final [`BatchResult`].
#[derive(Debug, Default)]
pub struct OutcomeTally {
    succeeded: usize,
    cancelled: usize,
    failures: Vec<(TaskId, FailedFile)>,
}

impl OutcomeTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &TaskOutcome) {
        match &outcome.error {
            None => self.succeeded += 1,
            Some(_) if outcome.is_cancelled() => self.cancelled += 1,
            Some(error) => self.failures.push((
                outcome.id,
                FailedFile {
                    input_path: outcome.input_path.clone(),
                    error: error.clone(),
                },
            )),
        }
    }

    /// Failures are listed in submission order regardless of completion order.
    pub fn into_result(mut self, total: usize) -> BatchResult {
        self.failures.sort_by_key(|(id, _)| *id);
        BatchResult {
            total,
            succeeded: self.succeeded,
            failed: self.failures.len(),
            cancelled: self.cancelled,
            errors: self.failures.into_iter().map(|(_, f)| f).collect(),
        }
    }
}

/// Batch finish line, plus a warning when anything did not succeed.
pub fn log_batch_summary(result: &BatchResult, batch_log: &BatchLog) {
    batch_log.info(&format!(
        "Batch finished: {} total, {} succeeded, {} failed, {} cancelled.",
        result.total, result.succeeded, result.failed, result.cancelled
    ));
    if result.failed > 0 {
        batch_log.warn(&format!(
            "{} file(s) could not be processed; see the errors above.",
            result.failed
        ));
    }
    if result.cancelled > 0 {
        batch_log.warn(&format!(
            "Batch cancelled: {} file(s) were not processed.",
            result.cancelled
        ));
    }
}
