//! Bottom-up sweep of empty directories.

use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Remove every directory strictly below `root` that is empty at the time it is visited,
/// deepest first, so a parent emptied by removing its children goes too. `root` itself stays.
/// Returns the number of directories removed.
pub fn remove_empty_dirs(root: &Path) -> usize {
    remove_empty_dirs_except(root, &[])
}

/// Like [`remove_empty_dirs`], but directories in `keep` are neither removed nor descended into.
pub fn remove_empty_dirs_except(root: &Path, keep: &[&Path]) -> usize {
    info!("clean {}", root.display());
    let mut dirs: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !keep.contains(&e.path()))
        .filter_map(|r| match r {
            Ok(entry) if entry.file_type().is_dir() => Some(entry.into_path()),
            Ok(_) => None,
            Err(e) => {
                warn!("walk error [{}]", e);
                None
            }
        })
        .collect();
    // Sorted order puts every parent before its children; walk it backwards.
    dirs.sort();

    let mut removed = 0_usize;
    for dir in dirs.iter().rev() {
        let is_empty = match fs::read_dir(dir) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => false,
        };
        if is_empty {
            match fs::remove_dir(dir) {
                Ok(()) => removed += 1,
                Err(e) => debug!("keep {}: {}", dir.display(), e),
            }
        }
    }
    removed
}
