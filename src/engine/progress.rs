//! Progress bar utilities for displaying batch status

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

use crate::types::ProgressSnapshot;

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    /// Create a new progress bar configuration
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

/// Create a progress bar with the given configuration
pub fn create_progress_bar(config: ProgressBarConfig) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = config.total,
        desc = config.desc,
        animation = config.animation,
        unit = " files"
    )))
}

/// Update the bar's total (known once scanning is done). Refreshes the display.
pub fn set_bar_total(pb: &ProgressBar, total: usize) {
    if let Ok(mut bar) = pb.lock() {
        bar.total = total;
        let _ = bar.refresh();
    }
}

/// Move the bar to an absolute position.
pub fn update_progress_bar_to(pb: &ProgressBar, completed: usize) {
    if let Ok(mut bar) = pb.lock() {
        let _ = bar.update_to(completed);
    }
}

/// Observer for [`BatchRunner::run`](crate::pipeline::BatchRunner::run) that drives a bar.
/// The failure sentinel leaves the bar where it is; the caller reports the error.
pub fn bar_observer(bar: &ProgressBar) -> impl FnMut(ProgressSnapshot) + use<> {
    let bar = Arc::clone(bar);
    let mut total_set = false;
    move |snapshot: ProgressSnapshot| {
        if snapshot.is_failure() {
            return;
        }
        if !total_set {
            set_bar_total(&bar, snapshot.total as usize);
            total_set = true;
        }
        update_progress_bar_to(&bar, snapshot.completed as usize);
    }
}

/// Print a newline after the bar so following output starts on a clean line.
pub fn finish_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.lock() {
        let _ = bar.refresh();
    }
    eprintln!();
}
