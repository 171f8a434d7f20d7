//! Archive branch: dedup check, extraction, source archival, and the rescan of what came out.
//!
//! ```text
//! Hashed ─ exists(hash, ext)? ─ yes ─> Duplicate (source deleted)
//!                              └ no ──> Extracting ─ ok ──> archived to done  ─> rescan dest
//!                                                   └ err ─> dest purged, archived to error
//! ```

use log::{debug, info, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::engine::tools::display_path;
use crate::{ContentHash, Outcome, Partition};

use super::coordinator::Coordinator;
use super::router::Placement;
use super::store::DedupStore;

pub(crate) fn handle_archive(
    coord: &Arc<Coordinator>,
    src: &Path,
    hash: &ContentHash,
    ext: &str,
) -> Outcome {
    let ctx = coord.ctx();
    let shown = display_path(src, &ctx.base);
    let store = DedupStore::new(&ctx.layout);

    if let Some(partition) = store.lookup(hash, ext) {
        debug!("{} already processed ({:?}): {}{}", shown, partition, hash, ext);
        return match fs::remove_file(src) {
            Ok(()) => Outcome::Duplicate,
            Err(e) => {
                warn!("failed to remove duplicate {}: {}", shown, e);
                Outcome::Deferred
            }
        };
    }

    let Some(extractor) = ctx.extractors.get(ext) else {
        warn!("no extractor registered for {} ({})", ext, shown);
        return Outcome::Deferred;
    };
    if let Err(e) = extractor.available() {
        warn!("{} skipped for now: {}", shown, e);
        return Outcome::Deferred;
    }

    let dest = ctx.layout.unpack_dir(hash);
    info!("{} start {}", extractor.name(), shown);
    let partition = match extractor.unpack(src, &dest, &ctx.unpack_opts) {
        Ok(report) => {
            info!(
                "{} end {} ({} files, {} skipped)",
                extractor.name(),
                shown,
                report.files,
                report.skipped
            );
            Partition::Done
        }
        Err(e) if e.is_environmental() => {
            warn!("{} left in place: {}", shown, e);
            return Outcome::Deferred;
        }
        Err(e) => {
            warn!("Extract {} error {}", shown, e);
            purge_unpack_dir(&dest);
            Partition::Error
        }
    };

    let committed = match store.commit(src, hash, ext, partition) {
        Ok(Placement::Moved(to)) => {
            debug!("{} -> {}", shown, to.display());
            true
        }
        Ok(Placement::Discarded) => {
            debug!("{} archived meanwhile by another task; source dropped", shown);
            true
        }
        Err(e) => {
            warn!("{}", e);
            false
        }
    };

    // The unpacked tree is complete whether or not the source could be archived.
    if partition == Partition::Done {
        coord.spawn_scan(dest);
    }

    if committed {
        Outcome::Archived(partition)
    } else {
        Outcome::Deferred
    }
}

/// Drop whatever a failed extraction wrote so it is never scanned as if complete.
fn purge_unpack_dir(dest: &Path) {
    match fs::remove_dir_all(dest) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("failed to purge {}: {}", dest.display(), e),
    }
}
