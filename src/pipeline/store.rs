//! Dedup store for archives: the filesystem is the record.
//!
//! An archive with content hash `H` and extension `.x` counts as processed when `H.x` exists in
//! either the done or the error partition. Nothing is cached in memory, so checks see moves made
//! by other tasks and by earlier runs. The check and the commit are separate steps; two tasks
//! holding identical archives can both pass the check, and the later commit then discards its
//! source rather than overwrite.

use std::path::{Path, PathBuf};

use crate::error::TaskError;
use crate::{ContentHash, Layout, Partition};

use super::router::{Placement, move_or_discard};

pub struct DedupStore<'a> {
    layout: &'a Layout,
}

impl<'a> DedupStore<'a> {
    pub fn new(layout: &'a Layout) -> Self {
        DedupStore { layout }
    }

    /// `<partition-root>/<hash><ext>`
    pub fn location(&self, hash: &ContentHash, ext: &str, partition: Partition) -> PathBuf {
        self.layout
            .partition_root(partition)
            .join(hash.file_name(ext))
    }

    /// Partition holding `hash`+`ext`, if any. Done wins when both exist.
    pub fn lookup(&self, hash: &ContentHash, ext: &str) -> Option<Partition> {
        [Partition::Done, Partition::Error]
            .into_iter()
            .find(|p| self.location(hash, ext, *p).exists())
    }

    pub fn exists(&self, hash: &ContentHash, ext: &str) -> bool {
        self.lookup(hash, ext).is_some()
    }

    /// Move `src` into `partition` as `<hash><ext>`, creating parents. If that name is already
    /// taken, `src` is deleted instead.
    pub fn commit(
        &self,
        src: &Path,
        hash: &ContentHash,
        ext: &str,
        partition: Partition,
    ) -> Result<Placement, TaskError> {
        move_or_discard(src, &self.location(hash, ext, partition))
    }
}
