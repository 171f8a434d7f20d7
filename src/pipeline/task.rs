use log::warn;
use std::path::Path;
use std::sync::Arc;

use crate::engine::hashing::hash_file;
use crate::{Branch, Outcome};

use super::archive::handle_archive;
use super::coordinator::Coordinator;
use super::router::route;

/// One file task: hash, classify, then extract or route. Every error is contained here.
pub(crate) fn process_file(coord: &Arc<Coordinator>, path: &Path) -> Outcome {
    let ctx = coord.ctx();
    let hash = match hash_file(path) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("{}", e);
            return Outcome::Deferred;
        }
    };
    let classified = ctx.classifier.classify(path);
    match classified.branch {
        Branch::Archive => handle_archive(coord, path, &hash, &classified.ext),
        Branch::Leaf(category) => route(&ctx.layout, path, &hash, &classified.ext, category),
    }
}
