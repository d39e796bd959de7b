//! Progress aggregation: counts finished tasks and forwards snapshots to the caller's observer.
//!
//! All observer calls go through one mutex, so the observer is never entered concurrently even when
//! [`ProgressAggregator::on_outcome`] is called from several threads.

use std::sync::Mutex;

use crate::types::{ProgressSnapshot, TaskOutcome};

struct AggregatorState<F> {
    completed: usize,
    terminated: bool,
    observer: F,
}

pub struct ProgressAggregator<F>
where
    F: FnMut(ProgressSnapshot),
{
    total: usize,
    state: Mutex<AggregatorState<F>>,
}

impl<F> ProgressAggregator<F>
where
    F: FnMut(ProgressSnapshot),
{
    /// `total` is fixed for the aggregator's lifetime.
    pub fn new(total: usize, observer: F) -> Self {
        Self {
            total,
            state: Mutex::new(AggregatorState {
                completed: 0,
                terminated: false,
                observer,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AggregatorState<F>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Report the starting point `{0, total}`.
    pub fn start(&self) -> Option<ProgressSnapshot> {
        let mut state = self.lock();
        if state.terminated {
            return None;
        }
        let snapshot = ProgressSnapshot::new(state.completed, self.total);
        (state.observer)(snapshot);
        Some(snapshot)
    }

    /// Count one finished task (success or failure) and emit the new snapshot synchronously.
    /// Returns None once reporting has terminated or every task is already counted.
    pub fn on_outcome(&self, outcome: &TaskOutcome) -> Option<ProgressSnapshot> {
        let mut state = self.lock();
        if state.terminated {
            return None;
        }
        if state.completed >= self.total {
            log::warn!(
                "progress: extra outcome for {} ignored ({} of {} already counted)",
                outcome.input_path.display(),
                state.completed,
                self.total
            );
            return None;
        }
        state.completed += 1;
        let snapshot = ProgressSnapshot::new(state.completed, self.total);
        (state.observer)(snapshot);
        Some(snapshot)
    }

    /// Emit the failure sentinel and stop reporting.
    pub fn fail(&self) {
        let mut state = self.lock();
        if state.terminated {
            return;
        }
        state.terminated = true;
        (state.observer)(ProgressSnapshot::FAILED);
    }

    /// Hand the observer back, e.g. to rebuild the aggregator once the total is known.
    pub fn into_observer(self) -> F {
        self.state
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::types::{CopyRequest, Task, TaskId};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;

    fn outcome(i: usize, ok: bool) -> TaskOutcome {
        let task = Task::Copy(CopyRequest {
            input_path: PathBuf::from(format!("in/{i}.txt")),
            output_path: PathBuf::from(format!("out/{i}.txt")),
        });
        if ok {
            TaskOutcome::succeeded(TaskId(i), &task)
        } else {
            TaskOutcome::failed(TaskId(i), &task, TaskError::copy("boom"))
        }
    }

    #[test]
    fn counts_failures_like_successes() {
        let mut seen = Vec::new();
        {
            let agg = ProgressAggregator::new(3, |s| seen.push(s));
            agg.on_outcome(&outcome(0, true));
            agg.on_outcome(&outcome(1, false));
            agg.on_outcome(&outcome(2, true));
        }
        let completed: Vec<i64> = seen.iter().map(|s| s.completed).collect();
        assert_eq!(completed, vec![1, 2, 3]);
        assert!(seen.iter().all(|s| s.total == 3));
    }

    #[test]
    fn never_exceeds_total() {
        let mut seen = Vec::new();
        {
            let agg = ProgressAggregator::new(1, |s| seen.push(s));
            assert!(agg.on_outcome(&outcome(0, true)).is_some());
            assert!(agg.on_outcome(&outcome(1, true)).is_none());
        }
        assert_eq!(seen, vec![ProgressSnapshot::new(1, 1)]);
    }

    #[test]
    fn fail_emits_sentinel_once_and_stops_reporting() {
        let mut seen = Vec::new();
        {
            let agg = ProgressAggregator::new(2, |s| seen.push(s));
            agg.fail();
            agg.fail();
            assert!(agg.on_outcome(&outcome(0, true)).is_none());
        }
        assert_eq!(seen, vec![ProgressSnapshot::FAILED]);
    }

    #[test]
    fn concurrent_outcomes_are_serialized_and_monotonic() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let agg = Arc::new(ProgressAggregator::new(64, move |s: ProgressSnapshot| {
            sink.lock().unwrap().push(s.completed)
        }));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let agg = Arc::clone(&agg);
                thread::spawn(move || {
                    for i in 0..8 {
                        agg.on_outcome(&outcome(t * 8 + i, true));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let seen = seen.lock().unwrap();
        assert_eq!(*seen, (1..=64).collect::<Vec<i64>>());
    }
}
