use log::{debug, warn};
use std::fs;
use std::path::Path;

use super::shared::{claim_destination, entry_error, open_error, sanitize_entry_path};
use super::{Extractor, UnpackOpts, UnpackReport};
use crate::error::ExtractionError;

/// Archive extractor for RAR files (bundled unrar library).
pub struct RarExtractor;

impl Extractor for RarExtractor {
    fn name(&self) -> &'static str {
        "rar"
    }

    /// The unrar handle is consumed by a failed extract, so a broken entry always ends the
    /// walk. With `continue_on_error` the entries written so far are kept and the archive
    /// counts as unpacked; otherwise it fails.
    fn unpack(
        &self,
        archive_path: &Path,
        dest: &Path,
        opts: &UnpackOpts,
    ) -> Result<UnpackReport, ExtractionError> {
        claim_destination(dest)?;

        let mut at_header = unrar::Archive::new(archive_path)
            .open_for_processing()
            .map_err(|e| open_error(archive_path, e))?;

        let mut report = UnpackReport::default();
        loop {
            let at_file = match at_header.read_header() {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    report.entry_failed(entry_error(archive_path, "<header>", e), opts)?;
                    break;
                }
            };

            let (name, is_dir, rel) = {
                let header = at_file.entry();
                (
                    header.filename.display().to_string(),
                    header.is_directory(),
                    sanitize_entry_path(&header.filename),
                )
            };

            let rel = match rel {
                Some(rel) if !is_dir => rel,
                Some(rel) => {
                    let dir = dest.join(rel);
                    fs::create_dir_all(&dir).map_err(|e| ExtractionError::io(&dir, e))?;
                    at_header = at_file.skip().map_err(|e| entry_error(archive_path, name, e))?;
                    continue;
                }
                None => {
                    warn!("skipping entry with unsafe path: {}", name);
                    at_header = at_file.skip().map_err(|e| entry_error(archive_path, name, e))?;
                    continue;
                }
            };

            let out = dest.join(rel);
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent).map_err(|e| ExtractionError::io(parent, e))?;
            }
            match at_file.extract_to(&out) {
                Ok(next) => {
                    report.files += 1;
                    at_header = next;
                }
                Err(e) => {
                    let _ = fs::remove_file(&out);
                    report.entry_failed(entry_error(archive_path, name, e), opts)?;
                    break;
                }
            }
        }

        debug!(
            "rar: {} file(s), {} skipped from {}",
            report.files,
            report.skipped,
            archive_path.display()
        );
        Ok(report)
    }
}
