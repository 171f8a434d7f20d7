use log::debug;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use walkdir::WalkDir;

use super::shared::claim_destination;
use super::{Extractor, UnpackOpts, UnpackReport};
use crate::error::ExtractionError;
use crate::utils::config::SEVENZIP_BINARIES;

/// 7z exit code for "warning (non fatal error(s))", e.g. some files could not be extracted.
const SEVENZIP_EXIT_WARNING: i32 = 1;

/// Archive extractor for 7z files, delegating to the `7z` command line tool.
pub struct SevenZipExtractor {
    candidates: Vec<String>,
}

impl Default for SevenZipExtractor {
    fn default() -> Self {
        SevenZipExtractor {
            candidates: SEVENZIP_BINARIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SevenZipExtractor {
    /// Use these binary names (tried in order on PATH) instead of the defaults.
    pub fn with_candidates<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SevenZipExtractor {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    fn locate(&self) -> Result<PathBuf, ExtractionError> {
        self.candidates
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| ExtractionError::ToolMissing {
                candidates: self.candidates.clone(),
            })
    }
}

impl Extractor for SevenZipExtractor {
    fn name(&self) -> &'static str {
        "7z"
    }

    fn available(&self) -> Result<(), ExtractionError> {
        self.locate().map(|_| ())
    }

    fn unpack(
        &self,
        archive_path: &Path,
        dest: &Path,
        opts: &UnpackOpts,
    ) -> Result<UnpackReport, ExtractionError> {
        let tool = self.locate()?;
        claim_destination(dest)?;

        let mut out_arg = OsString::from("-o");
        out_arg.push(dest);
        // Empty -p so encrypted archives fail instead of prompting.
        let output = Command::new(&tool)
            .arg("x")
            .arg("-p")
            .arg("-y")
            .arg(out_arg)
            .arg(archive_path)
            .stdin(Stdio::null())
            .output();
        let output = match output {
            Ok(output) => output,
            Err(source) => {
                // Nothing was written; hand the destination back so a later run can claim it.
                let _ = fs::remove_dir(dest);
                return Err(ExtractionError::ToolSpawn { tool, source });
            }
        };

        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        debug!("7z output for {}:\n{}", archive_path.display(), combined.trim_end());

        let tolerated =
            opts.continue_on_error && output.status.code() == Some(SEVENZIP_EXIT_WARNING);
        if !output.status.success() && !tolerated {
            return Err(ExtractionError::ToolFailed {
                archive: archive_path.to_path_buf(),
                tool: tool.display().to_string(),
                status: output.status.to_string(),
                output: combined.trim().to_string(),
            });
        }

        // The tool reports no per-entry counts; count what landed.
        let files = WalkDir::new(dest)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .count();
        Ok(UnpackReport {
            files,
            skipped: usize::from(tolerated),
        })
    }
}
