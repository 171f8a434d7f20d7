//! Public and internal types for the unnest API and pipeline.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::utils::config::{
    DEFAULT_DOCUMENT_EXTS, DEFAULT_SKIP_PATTERNS, DEFAULT_SPREADSHEET_EXTS, DEFAULT_WORK_DIR,
    LayoutDefaults, SHARD_LEN,
};

/// Lowercase hex blake3 digest of a file's bytes. Identity for dedup and destination naming.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shard directory name: the first [`SHARD_LEN`] hex characters.
    pub fn shard(&self) -> &str {
        &self.0[..SHARD_LEN]
    }

    /// `<hash><ext>` file name used by every content-addressed root.
    pub fn file_name(&self, ext: &str) -> String {
        format!("{}{}", self.0, ext)
    }
}

impl From<blake3::Hash> for ContentHash {
    fn from(h: blake3::Hash) -> Self {
        ContentHash(h.to_hex().to_string())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Destination category for non-archive files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Document,
    Spreadsheet,
    Other,
}

impl Category {
    /// Documents shard by hash prefix to bound directory fan-out; the others are flat.
    pub fn is_sharded(&self) -> bool {
        matches!(self, Category::Document)
    }
}

/// Which partition of the dedup store an archive landed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partition {
    /// Extracted successfully (or kept as a dedup marker).
    Done,
    /// Extraction failed.
    Error,
}

/// Result of classifying a file by its extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Branch {
    /// Extension is registered in the extractor table.
    Archive,
    Leaf(Category),
}

/// Branch plus the matched extension (lowercase, with leading dot, possibly compound like `.tar.gz`; empty if none).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classified {
    pub branch: Branch,
    pub ext: String,
}

/// Terminal state of one file task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Moved into its category store.
    Routed(Category),
    /// Archive source moved into the done or error partition.
    Archived(Partition),
    /// Identical content already stored; the source was deleted.
    Duplicate,
    /// Contained failure (read, move, busy destination, missing tool). Source left in place for the next run.
    Deferred,
}

/// Absolute paths of the six output roots.
#[derive(Clone, Debug)]
pub struct Layout {
    pub unpack: PathBuf,
    pub done: PathBuf,
    pub error: PathBuf,
    pub document: PathBuf,
    pub spreadsheet: PathBuf,
    pub other: PathBuf,
}

impl Layout {
    pub fn new(base: &Path, names: &LayoutNames) -> Self {
        Layout {
            unpack: base.join(&names.unpack),
            done: base.join(&names.done),
            error: base.join(&names.error),
            document: base.join(&names.document),
            spreadsheet: base.join(&names.spreadsheet),
            other: base.join(&names.other),
        }
    }

    pub fn category_root(&self, category: Category) -> &Path {
        match category {
            Category::Document => &self.document,
            Category::Spreadsheet => &self.spreadsheet,
            Category::Other => &self.other,
        }
    }

    pub fn partition_root(&self, partition: Partition) -> &Path {
        match partition {
            Partition::Done => &self.done,
            Partition::Error => &self.error,
        }
    }

    /// Extraction destination for an archive: `unpack/<hash>`.
    pub fn unpack_dir(&self, hash: &ContentHash) -> PathBuf {
        self.unpack.join(hash.as_str())
    }

    pub fn roots(&self) -> [&Path; 6] {
        [
            &self.unpack,
            &self.done,
            &self.error,
            &self.document,
            &self.spreadsheet,
            &self.other,
        ]
    }
}

/// Directory names of the output roots, relative to the base directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutNames {
    pub unpack: String,
    pub done: String,
    pub error: String,
    pub document: String,
    pub spreadsheet: String,
    pub other: String,
}

impl Default for LayoutNames {
    fn default() -> Self {
        LayoutNames {
            unpack: LayoutDefaults::UNPACK.to_string(),
            done: LayoutDefaults::DONE.to_string(),
            error: LayoutDefaults::ERROR.to_string(),
            document: LayoutDefaults::DOCUMENT.to_string(),
            spreadsheet: LayoutDefaults::SPREADSHEET.to_string(),
            other: LayoutDefaults::OTHER.to_string(),
        }
    }
}

/// Counts reported at the end of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_seen: usize,
    pub routed_documents: usize,
    pub routed_spreadsheets: usize,
    pub routed_other: usize,
    pub archives_extracted: usize,
    pub archives_failed: usize,
    pub duplicates: usize,
    pub deferred: usize,
    pub dirs_removed: usize,
}

impl RunSummary {
    pub fn routed(&self) -> usize {
        self.routed_documents + self.routed_spreadsheets + self.routed_other
    }
}

/// Full options for a run (CLI and lib).
#[derive(Clone, Debug)]
pub struct Opts {
    /// Directory holding the output layout. Relative roots in [`LayoutNames`] resolve against it.
    pub base_dir: PathBuf,
    /// Directory of incoming files. Resolved against `base_dir` when relative. Must exist.
    pub work_dir: PathBuf,
    /// Parallelism ceiling for file tasks. When None, derived from available threads and FD limit.
    pub jobs: Option<usize>,
    /// Skip broken archive entries and keep unpacking instead of failing the whole archive.
    pub continue_on_error: bool,
    /// File-name globs of in-progress downloads; matching files are never touched.
    pub skip_patterns: Vec<String>,
    pub layout: LayoutNames,
    /// Extensions (lowercase, with dot) routed to the document store.
    pub document_exts: Vec<String>,
    /// Extensions (lowercase, with dot) routed to the spreadsheet store.
    pub spreadsheet_exts: Vec<String>,
    /// Debug logging.
    pub verbose: bool,
    /// Show a counter of finished file tasks.
    pub progress: bool,
    /// Print the run summary as JSON on stdout.
    pub json: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Opts {
            base_dir: PathBuf::from("."),
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            jobs: None,
            continue_on_error: false,
            skip_patterns: DEFAULT_SKIP_PATTERNS.iter().map(|s| s.to_string()).collect(),
            layout: LayoutNames::default(),
            document_exts: DEFAULT_DOCUMENT_EXTS.iter().map(|s| s.to_string()).collect(),
            spreadsheet_exts: DEFAULT_SPREADSHEET_EXTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            verbose: false,
            progress: false,
            json: false,
        }
    }
}

impl Opts {
    /// Work directory resolved against the base directory.
    pub fn resolved_work_dir(&self) -> PathBuf {
        if self.work_dir.is_absolute() {
            self.work_dir.clone()
        } else {
            self.base_dir.join(&self.work_dir)
        }
    }
}
