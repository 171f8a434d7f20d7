//! Router: content-addressed placement of non-archive files.

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::TaskError;
use crate::{Category, ContentHash, Layout, Outcome};

/// Where a move-or-discard left the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Source renamed to this path.
    Moved(PathBuf),
    /// Destination already held this content; source deleted.
    Discarded,
}

/// `<category-root>/[<hash[..2]>/]<hash><ext>`
pub fn destination(layout: &Layout, hash: &ContentHash, ext: &str, category: Category) -> PathBuf {
    let root = layout.category_root(category);
    let name = hash.file_name(ext);
    if category.is_sharded() {
        root.join(hash.shard()).join(name)
    } else {
        root.join(name)
    }
}

/// Rename `src` to `dest` unless `dest` exists, in which case `src` is deleted instead.
/// Existing content is never replaced. On failure `src` stays where it was.
pub fn move_or_discard(src: &Path, dest: &Path) -> Result<Placement, TaskError> {
    let move_err = |source| TaskError::Move {
        from: src.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    };
    if dest.try_exists().map_err(move_err)? {
        fs::remove_file(src).map_err(move_err)?;
        return Ok(Placement::Discarded);
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(move_err)?;
    }
    fs::rename(src, dest).map_err(move_err)?;
    Ok(Placement::Moved(dest.to_path_buf()))
}

/// File a leaf into its category store.
pub fn route(
    layout: &Layout,
    src: &Path,
    hash: &ContentHash,
    ext: &str,
    category: Category,
) -> Outcome {
    let dest = destination(layout, hash, ext, category);
    match move_or_discard(src, &dest) {
        Ok(Placement::Moved(to)) => {
            debug!("{} -> {}", src.display(), to.display());
            Outcome::Routed(category)
        }
        Ok(Placement::Discarded) => {
            debug!("duplicate {} of {}", src.display(), dest.display());
            Outcome::Duplicate
        }
        Err(e) => {
            warn!("{}", e);
            Outcome::Deferred
        }
    }
}
