//! Pipeline context: the read-only data every task needs, plus run counters.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::engine::classify::Classifier;
use crate::engine::tools::matches_any_pattern;
use crate::extraction::{ExtractorTable, UnpackOpts};
use crate::utils::config::PackagePaths;
use crate::{Category, Layout, Opts, Outcome, Partition, RunSummary};

/// Which paths a scan leaves alone.
#[derive(Clone, Debug, Default)]
pub struct ScanFilter {
    /// File-name globs of in-progress downloads.
    pub skip_patterns: Vec<String>,
    /// Directories never descended into (the output roots), unless the scan is rooted there.
    pub pruned_dirs: Vec<PathBuf>,
    /// Exact files never picked up (the base directory's config file).
    pub excluded_files: Vec<PathBuf>,
}

impl ScanFilter {
    pub fn skips_file(&self, path: &Path) -> bool {
        self.excluded_files.iter().any(|p| p == path)
            || matches_any_pattern(path, &self.skip_patterns)
    }

    /// True for an output root found below `root`. The scan root itself is never pruned.
    pub fn prunes_dir(&self, root: &Path, dir: &Path) -> bool {
        dir != root && self.pruned_dirs.iter().any(|p| p == dir)
    }
}

/// Shared, read-only context for scan and file tasks. Built once per run.
pub struct PipelineContext {
    /// Canonical base directory (for log display).
    pub base: PathBuf,
    pub layout: Layout,
    pub classifier: Classifier,
    pub extractors: ExtractorTable,
    pub unpack_opts: UnpackOpts,
    pub scan_filter: ScanFilter,
}

impl PipelineContext {
    pub fn new(base: &Path, layout: Layout, opts: &Opts, extractors: ExtractorTable) -> Self {
        let classifier = Classifier::new(
            extractors.extensions(),
            &opts.document_exts,
            &opts.spreadsheet_exts,
        );
        let scan_filter = ScanFilter {
            skip_patterns: opts.skip_patterns.clone(),
            pruned_dirs: layout.roots().iter().map(|p| p.to_path_buf()).collect(),
            excluded_files: vec![base.join(PackagePaths::get().config_filename())],
        };
        PipelineContext {
            base: base.to_path_buf(),
            layout,
            classifier,
            extractors,
            unpack_opts: UnpackOpts {
                continue_on_error: opts.continue_on_error,
            },
            scan_filter,
        }
    }
}

/// Lock-free counters updated by tasks; turned into a [`RunSummary`] at the end.
#[derive(Default)]
pub struct RunStats {
    files_seen: AtomicUsize,
    finished: AtomicUsize,
    routed_documents: AtomicUsize,
    routed_spreadsheets: AtomicUsize,
    routed_other: AtomicUsize,
    archives_extracted: AtomicUsize,
    archives_failed: AtomicUsize,
    duplicates: AtomicUsize,
    deferred: AtomicUsize,
}

impl RunStats {
    pub fn saw_file(&self) {
        self.files_seen.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a finished file task. Returns the number of finished tasks so far.
    pub fn record(&self, outcome: Outcome) -> usize {
        let counter = match outcome {
            Outcome::Routed(Category::Document) => &self.routed_documents,
            Outcome::Routed(Category::Spreadsheet) => &self.routed_spreadsheets,
            Outcome::Routed(Category::Other) => &self.routed_other,
            Outcome::Archived(Partition::Done) => &self.archives_extracted,
            Outcome::Archived(Partition::Error) => &self.archives_failed,
            Outcome::Duplicate => &self.duplicates,
            Outcome::Deferred => &self.deferred,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.finished.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn snapshot(&self) -> RunSummary {
        let get = |c: &AtomicUsize| c.load(Ordering::Relaxed);
        RunSummary {
            files_seen: get(&self.files_seen),
            routed_documents: get(&self.routed_documents),
            routed_spreadsheets: get(&self.routed_spreadsheets),
            routed_other: get(&self.routed_other),
            archives_extracted: get(&self.archives_extracted),
            archives_failed: get(&self.archives_failed),
            duplicates: get(&self.duplicates),
            deferred: get(&self.deferred),
            dirs_removed: 0,
        }
    }
}
