//! Scanner: lazily yields the regular files under a root, skipping sentinels and pruned dirs.

use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::TaskError;

use super::context::ScanFilter;

/// One result from a directory walk.
pub enum WalkOutcome {
    /// A regular file.
    File(PathBuf),
    /// Directory, symlink, or special file: nothing to do.
    NotAFile,
    Err(TaskError),
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(
    root: &Path,
    r: Result<walkdir::DirEntry, walkdir::Error>,
) -> WalkOutcome {
    match r {
        Ok(entry) if entry.file_type().is_file() => WalkOutcome::File(entry.into_path()),
        Ok(_) => WalkOutcome::NotAFile,
        Err(err) => WalkOutcome::Err(TaskError::Walk {
            root: root.to_path_buf(),
            path: err.path().map(PathBuf::from),
            message: err.to_string(),
        }),
    }
}

/// Files under `root`, discovered lazily. Restart by calling again.
///
/// Symlinks are not followed. A directory that cannot be read is logged and skipped; its
/// siblings are still walked. Files matching the filter's skip patterns are left untouched.
pub fn scan<'a>(root: &'a Path, filter: &'a ScanFilter) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(move |e| !(e.file_type().is_dir() && filter.prunes_dir(root, e.path())))
        .filter_map(move |r| match to_outcome_walkdir(root, r) {
            WalkOutcome::File(path) if filter.skips_file(&path) => {
                debug!("Skip {}", path.display());
                None
            }
            WalkOutcome::File(path) => Some(path),
            WalkOutcome::NotAFile => None,
            WalkOutcome::Err(e) => {
                warn!("{}", e);
                None
            }
        })
}
