//! Helpers shared by the format implementations.

use log::warn;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use super::{UnpackOpts, UnpackReport};
use crate::error::ExtractionError;

/// Create `dest` as a fresh, empty directory. Parents are created as needed; `dest` itself must not exist.
///
/// The non-recursive create is atomic, so of two tasks racing on the same destination exactly
/// one wins and the other gets [`ExtractionError::DestinationExists`].
pub fn claim_destination(dest: &Path) -> Result<(), ExtractionError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|source| ExtractionError::Claim {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    match fs::create_dir(dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(ExtractionError::DestinationExists(dest.to_path_buf()))
        }
        Err(source) => Err(ExtractionError::Claim {
            path: dest.to_path_buf(),
            source,
        }),
    }
}

/// Keep only normal components of an archive entry name, so `../../etc/passwd` and `/abs`
/// cannot escape the destination. None if nothing is left.
pub fn sanitize_entry_path(name: &Path) -> Option<PathBuf> {
    let sanitized = name
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect::<PathBuf>();
    if sanitized.as_os_str().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Stream one entry to `out`, creating parents. A failed write removes the partial file.
pub(crate) fn write_entry<R: Read>(reader: &mut R, out: &Path) -> io::Result<u64> {
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(out)?;
    match io::copy(reader, &mut file) {
        Ok(n) => Ok(n),
        Err(e) => {
            drop(file);
            let _ = fs::remove_file(out);
            Err(e)
        }
    }
}

impl UnpackReport {
    /// Apply the per-entry error policy: skip and count with `continue_on_error`, else fail.
    pub(crate) fn entry_failed(
        &mut self,
        err: ExtractionError,
        opts: &UnpackOpts,
    ) -> Result<(), ExtractionError> {
        if opts.continue_on_error {
            warn!("Skipping broken entry: {}", err);
            self.skipped += 1;
            Ok(())
        } else {
            Err(err)
        }
    }
}

pub(crate) fn entry_error(
    archive: &Path,
    entry: impl Into<String>,
    reason: impl ToString,
) -> ExtractionError {
    ExtractionError::Entry {
        archive: archive.to_path_buf(),
        entry: entry.into(),
        reason: reason.to_string(),
    }
}

pub(crate) fn open_error(archive: &Path, reason: impl ToString) -> ExtractionError {
    ExtractionError::Open {
        archive: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}
