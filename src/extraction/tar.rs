use flate2::read::GzDecoder;
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use super::shared::{claim_destination, entry_error, open_error, sanitize_entry_path};
use super::{Extractor, UnpackOpts, UnpackReport};
use crate::error::ExtractionError;

/// Archive extractor for tar files, optionally gzip-compressed (`.tar.gz`, `.tgz`).
pub struct TarExtractor {
    gzip: bool,
}

impl TarExtractor {
    pub fn plain() -> Self {
        TarExtractor { gzip: false }
    }

    pub fn gzip() -> Self {
        TarExtractor { gzip: true }
    }

    /// Walk the entry stream. A broken header ends the stream for good, so it always fails the
    /// archive; a failed unpack of one entry goes through the per-entry policy.
    fn unpack_entries<R: Read>(
        mut archive: ::tar::Archive<R>,
        archive_path: &Path,
        dest: &Path,
        opts: &UnpackOpts,
    ) -> Result<UnpackReport, ExtractionError> {
        let mut report = UnpackReport::default();
        let entries = archive
            .entries()
            .map_err(|e| open_error(archive_path, e))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| entry_error(archive_path, "<header>", e))?;
            let name = entry
                .path()
                .map(|p| p.into_owned())
                .unwrap_or_default();
            let kind = entry.header().entry_type();

            // Links and specials are not content; the scanner would ignore them anyway.
            if !(kind.is_file() || kind.is_dir()) {
                debug!("tar: skipping non-regular entry {}", name.display());
                continue;
            }

            match entry.unpack_in(dest) {
                Ok(true) => {
                    if kind.is_file() {
                        report.files += 1;
                    }
                }
                Ok(false) => warn!("skipping entry with unsafe path: {}", name.display()),
                Err(e) => {
                    if kind.is_file()
                        && let Some(rel) = sanitize_entry_path(&name)
                    {
                        let _ = fs::remove_file(dest.join(rel));
                    }
                    report.entry_failed(
                        entry_error(archive_path, name.display().to_string(), e),
                        opts,
                    )?;
                }
            }
        }
        Ok(report)
    }
}

impl Extractor for TarExtractor {
    fn name(&self) -> &'static str {
        if self.gzip { "tar.gz" } else { "tar" }
    }

    fn unpack(
        &self,
        archive_path: &Path,
        dest: &Path,
        opts: &UnpackOpts,
    ) -> Result<UnpackReport, ExtractionError> {
        claim_destination(dest)?;

        let file = File::open(archive_path).map_err(|e| open_error(archive_path, e))?;
        let reader = BufReader::new(file);
        let report = if self.gzip {
            Self::unpack_entries(
                ::tar::Archive::new(GzDecoder::new(reader)),
                archive_path,
                dest,
                opts,
            )?
        } else {
            Self::unpack_entries(::tar::Archive::new(reader), archive_path, dest, opts)?
        };

        debug!(
            "{}: {} file(s), {} skipped from {}",
            self.name(),
            report.files,
            report.skipped,
            archive_path.display()
        );
        Ok(report)
    }
}
