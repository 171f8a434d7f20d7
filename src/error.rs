//! Errors raised inside a single scan or file task.
//!
//! None of these abort a run: the task that raised one logs it and ends in
//! [`Outcome::Deferred`](crate::Outcome::Deferred) or, for extraction failures, archives the
//! source into the error partition. Run-level failures use [`anyhow`].

use std::path::PathBuf;
use thiserror::Error;

/// Per-task failure taxonomy.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Opening or hashing a file failed. No filesystem mutation happened.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A format-specific unpack failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Rename or delete failed. The source stays where it is for the next run.
    #[error("failed to move {from} -> {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal fault. The affected subtree is skipped.
    #[error("walk error under {root}: {message}")]
    Walk {
        root: PathBuf,
        path: Option<PathBuf>,
        message: String,
    },
}

/// Failure of an [`Extractor`](crate::extraction::Extractor).
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("cannot open archive {archive}: {reason}")]
    Open { archive: PathBuf, reason: String },

    #[error("entry {entry:?} of {archive}: {reason}")]
    Entry {
        archive: PathBuf,
        entry: String,
        reason: String,
    },

    #[error("{tool} failed on {archive} ({status}): {output}")]
    ToolFailed {
        archive: PathBuf,
        tool: String,
        status: String,
        output: String,
    },

    #[error("none of {candidates:?} found on PATH")]
    ToolMissing { candidates: Vec<String> },

    /// The tool was found but could not be started (bad interpreter, permissions, fd limit).
    #[error("cannot start {tool}: {source}")]
    ToolSpawn {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination directory already exists (claimed by another task or left over from a crash).
    #[error("extraction destination {0} already exists")]
    DestinationExists(PathBuf),

    /// The destination directory could not be created.
    #[error("cannot claim extraction destination {path}: {source}")]
    Claim {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractionError {
    /// Failures that say nothing about the archive itself. The archive is left in place for a
    /// later run instead of being filed as broken, and the destination is not touched.
    pub fn is_environmental(&self) -> bool {
        matches!(
            self,
            ExtractionError::DestinationExists(_)
                | ExtractionError::Claim { .. }
                | ExtractionError::ToolMissing { .. }
                | ExtractionError::ToolSpawn { .. }
        )
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractionError::Io {
            path: path.into(),
            source,
        }
    }
}
