//! One batch pass: precondition, pre-clean, scan and drain the task graph, post-clean.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::engine::parallel::resolve_parallelism;
use crate::engine::tools::check_dir_and_canonicalize;
use crate::extraction::ExtractorTable;
use crate::pipeline::{
    Coordinator, PipelineContext, remove_empty_dirs, remove_empty_dirs_except,
};
use crate::{Layout, Opts, RunSummary};

/// Run one batch pass over `opts.work_dir` with the built-in extractors (rar, zip, tar, tar.gz, 7z).
///
/// Returns an error only when the base or working directory is missing or the output layout
/// cannot be created. Everything else is counted in the returned [`RunSummary`]; files that
/// could not be handled stay in place for the next run.
pub fn sort_dir(opts: &Opts) -> Result<RunSummary> {
    sort_dir_with(opts, ExtractorTable::with_defaults())
}

/// Run the pipeline with `extractors` as the archive capability table.
///
/// Fails only if the base or working directory is missing (before any task exists) or the
/// output layout cannot be created. Per-file problems are counted in the summary instead.
pub fn sort_dir_with(opts: &Opts, extractors: ExtractorTable) -> Result<RunSummary> {
    let base = check_dir_and_canonicalize(&opts.base_dir, "base directory")?;
    let work_dir = check_dir_and_canonicalize(&opts.resolved_work_dir(), "working directory")?;
    let layout = Layout::new(&base, &opts.layout);
    ensure_layout(&layout)?;

    // Empty leftovers of an earlier run would otherwise block their hash's destination.
    let mut dirs_removed = remove_empty_dirs(&layout.unpack);

    let jobs = resolve_parallelism(opts.jobs);
    let ctx = PipelineContext::new(&base, layout.clone(), opts, extractors);
    debug!("{:?}", ctx.extractors);
    let coord = Coordinator::new(ctx, jobs, opts.progress)?;

    resume_unpacked(&coord, &layout.unpack);
    coord.spawn_scan(work_dir.clone());
    coord.wait();

    dirs_removed += remove_empty_dirs(&layout.unpack);
    // The layout may live inside the work dir; its roots stay even when empty.
    dirs_removed += remove_empty_dirs_except(&work_dir, &layout.roots());

    let mut summary = coord.summary();
    summary.dirs_removed = dirs_removed;
    Ok(summary)
}

fn ensure_layout(layout: &Layout) -> Result<()> {
    for root in layout.roots() {
        fs::create_dir_all(root).with_context(|| format!("create {}", root.display()))?;
    }
    Ok(())
}

/// Queue what earlier runs left in the unpack root. Only entries present now are taken, so
/// destinations created by this run's extractions are left to their own rescans.
fn resume_unpacked(coord: &Arc<Coordinator>, unpack_root: &Path) {
    let entries = match fs::read_dir(unpack_root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("cannot read {}: {}", unpack_root.display(), e);
            return;
        }
    };
    let mut leftovers = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => leftovers.push(entry),
            Err(e) => warn!("cannot read entry of {}: {}", unpack_root.display(), e),
        }
    }
    for entry in leftovers {
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => coord.spawn_scan(entry.path()),
            Ok(ft) if ft.is_file() => coord.spawn_file(entry.path()),
            Ok(_) => {}
            Err(e) => warn!("cannot stat {}: {}", entry.path().display(), e),
        }
    }
}
