use log::{debug, warn};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::shared::{claim_destination, entry_error, open_error, write_entry};
use super::{Extractor, UnpackOpts, UnpackReport};
use crate::error::ExtractionError;

/// Archive extractor for ZIP files
pub struct ZipExtractor;

impl ZipExtractor {
    /// Extract a single ZIP entry to disk, creating directories as needed.
    /// Returns the written file, or None for directories and unsafe names.
    fn extract_entry(
        archive: &mut ::zip::ZipArchive<File>,
        index: usize,
        dest: &Path,
        archive_path: &Path,
    ) -> Result<Option<PathBuf>, ExtractionError> {
        let mut file = archive
            .by_index(index)
            .map_err(|e| entry_error(archive_path, format!("#{index}"), e))?;

        let out = match file.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                warn!("skipping entry with unsafe path: {:?}", file.name());
                return Ok(None);
            }
        };

        if file.is_dir() {
            fs::create_dir_all(&out).map_err(|e| ExtractionError::io(&out, e))?;
            return Ok(None);
        }

        let name = file.name().to_string();
        write_entry(&mut file, &out).map_err(|e| entry_error(archive_path, name, e))?;
        Ok(Some(out))
    }
}

impl Extractor for ZipExtractor {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn unpack(
        &self,
        archive_path: &Path,
        dest: &Path,
        opts: &UnpackOpts,
    ) -> Result<UnpackReport, ExtractionError> {
        claim_destination(dest)?;

        let file = File::open(archive_path).map_err(|e| open_error(archive_path, e))?;
        let mut archive = ::zip::ZipArchive::new(file).map_err(|e| open_error(archive_path, e))?;

        let mut report = UnpackReport::default();
        for i in 0..archive.len() {
            match Self::extract_entry(&mut archive, i, dest, archive_path) {
                Ok(Some(_)) => report.files += 1,
                Ok(None) => {}
                Err(e) => report.entry_failed(e, opts)?,
            }
        }

        debug!(
            "zip: {} file(s), {} skipped from {}",
            report.files,
            report.skipped,
            archive_path.display()
        );
        Ok(report)
    }
}
