//! Concurrency controller: bounded file-task slots, a join counter that accepts work added
//! while someone is waiting on it, and the [`Coordinator`] every task is handed.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, bounded};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;

use crate::engine::progress::{ProgressBar, create_counter, finish_bar, update_progress_bar};
use crate::engine::tools::display_path;
use crate::{Outcome, RunSummary};

use super::context::{PipelineContext, RunStats};
use super::task::process_file;
use super::walk::scan;

/// Counting semaphore built on a bounded channel pre-filled with tokens.
/// [`Slots::acquire`] blocks while all tokens are out.
pub struct Slots {
    tx: Sender<()>,
    rx: Receiver<()>,
    capacity: usize,
}

impl Slots {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = bounded(capacity);
        for _ in 0..capacity {
            let _ = tx.send(());
        }
        Slots { tx, rx, capacity }
    }

    pub fn acquire(&self) -> SlotPermit {
        // Cannot disconnect: `self` holds a sender.
        let _ = self.rx.recv();
        SlotPermit {
            tx: self.tx.clone(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tokens currently free.
    pub fn available(&self) -> usize {
        self.rx.len()
    }
}

/// Returns its token on drop.
pub struct SlotPermit {
    tx: Sender<()>,
}

impl Drop for SlotPermit {
    fn drop(&mut self) {
        let _ = self.tx.try_send(());
    }
}

#[derive(Default)]
struct TrackerState {
    pending: Mutex<usize>,
    drained: Condvar,
}

/// Outstanding-work counter. Unlike a fixed join set, tasks may [`begin`](TaskTracker::begin)
/// new work while [`wait`](TaskTracker::wait) is already blocked; `wait` returns only once the
/// count reaches zero. A child must begin before its parent's guard drops.
#[derive(Clone, Default)]
pub struct TaskTracker {
    state: Arc<TrackerState>,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> TaskGuard {
        let mut pending = self
            .state
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *pending += 1;
        TaskGuard {
            state: Arc::clone(&self.state),
        }
    }

    pub fn pending(&self) -> usize {
        *self
            .state
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until every begun task has dropped its guard.
    pub fn wait(&self) {
        let mut pending = self
            .state
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while *pending > 0 {
            pending = self
                .state
                .drained
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Marks one task as finished when dropped (also on unwind).
pub struct TaskGuard {
    state: Arc<TrackerState>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        let mut pending = self
            .state
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.state.drained.notify_all();
        }
    }
}

/// Shared state of one run, constructed once and handed (as `Arc`) to every scan and file task.
///
/// Scan tasks each get their own thread and are not throttled. File tasks run on a rayon pool
/// sized to the ceiling and need a slot first; the scan that discovers a file blocks on the
/// slot, which keeps the number of queued file tasks bounded as well.
pub struct Coordinator {
    ctx: PipelineContext,
    slots: Slots,
    tracker: TaskTracker,
    pool: rayon::ThreadPool,
    stats: RunStats,
    progress: Option<ProgressBar>,
}

impl Coordinator {
    pub fn new(ctx: PipelineContext, jobs: usize, progress: bool) -> Result<Arc<Self>> {
        let jobs = jobs.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|i| format!("{}-file-{}", env!("CARGO_PKG_NAME"), i))
            .panic_handler(|_| error!("file task panicked; its file is left in place"))
            .build()
            .context("build file task pool")?;
        debug!("File task ceiling: {}", jobs);
        Ok(Arc::new(Coordinator {
            ctx,
            slots: Slots::new(jobs),
            tracker: TaskTracker::new(),
            pool,
            stats: RunStats::default(),
            progress: progress.then(|| create_counter("Sorting")),
        }))
    }

    pub fn ctx(&self) -> &PipelineContext {
        &self.ctx
    }

    pub fn jobs(&self) -> usize {
        self.slots.capacity()
    }

    /// Start a scan task rooted at `root` on its own thread.
    pub fn spawn_scan(self: &Arc<Self>, root: PathBuf) {
        let guard = self.tracker.begin();
        let this = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name(format!("{}-scan", env!("CARGO_PKG_NAME")))
            .spawn(move || {
                this.run_scan(&root);
                drop(this);
                drop(guard);
            });
        if let Err(e) = spawned {
            // The closure (and its guard) was dropped; the subtree waits for the next run.
            warn!("failed to start scan thread: {}", e);
        }
    }

    /// Queue one file task. Blocks until a slot is free.
    pub fn spawn_file(self: &Arc<Self>, path: PathBuf) {
        self.stats.saw_file();
        let permit = self.slots.acquire();
        let guard = self.tracker.begin();
        let this = Arc::clone(self);
        self.pool.spawn(move || {
            let outcome = process_file(&this, &path);
            this.finish(outcome);
            drop(permit);
            drop(this);
            drop(guard);
        });
    }

    /// Block until the whole task graph, including work spawned while waiting, has drained.
    pub fn wait(&self) {
        self.tracker.wait();
        if let Some(bar) = &self.progress {
            finish_bar(bar);
        }
    }

    pub fn summary(&self) -> RunSummary {
        self.stats.snapshot()
    }

    fn run_scan(self: &Arc<Self>, root: &Path) {
        let shown = display_path(root, &self.ctx.base);
        info!("Dir start {}", shown);
        let mut count = 0_usize;
        for path in scan(root, &self.ctx.scan_filter) {
            self.spawn_file(path);
            count += 1;
        }
        info!("Dir end {} ({} files)", shown, count);
    }

    fn finish(&self, outcome: Outcome) {
        let done = self.stats.record(outcome);
        if let Some(bar) = &self.progress {
            update_progress_bar(bar, done);
        }
    }
}
