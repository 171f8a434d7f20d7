//! Progress counter for finished file tasks

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a counter for unknown total (shows count without percentage). The task graph grows
/// as archives are unpacked, so there is never a known total.
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " files"
    )))
}

/// Set the bar to `done` finished tasks. Uses try_lock so file tasks never block on the bar;
/// a skipped update is caught up by the next one since the count is absolute.
pub fn update_progress_bar(pb: &ProgressBar, done: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update_to(done);
    }
}

/// Final refresh so the last count is shown; blocks until the lock is free.
pub fn finish_bar(pb: &ProgressBar) {
    let mut bar = pb.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let _ = bar.refresh();
    eprintln!();
}
