//! Archive extraction
//!
//! One [`Extractor`] per archive format, looked up by extension in an [`ExtractorTable`].
//! The pipeline only ever talks to the table, so adding a format means registering one more
//! implementation; classification picks up the new extension from the table as well.

mod rar;
mod sevenz;
mod shared;
mod tar;
mod zip;

pub use self::rar::RarExtractor;
pub use self::sevenz::SevenZipExtractor;
pub use self::shared::{claim_destination, sanitize_entry_path};
pub use self::tar::TarExtractor;
pub use self::zip::ZipExtractor;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::engine::classify::normalize_ext;
use crate::error::ExtractionError;

/// Knobs passed to every unpack call.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnpackOpts {
    /// Skip an entry that fails to unpack and keep going, instead of failing the archive.
    pub continue_on_error: bool,
}

/// What an unpack call wrote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnpackReport {
    /// Regular files written to the destination.
    pub files: usize,
    /// Entries that failed and were skipped (only with `continue_on_error`).
    pub skipped: usize,
}

/// Format-specific unpacker.
///
/// Contract for implementations:
/// - claim `dest` with [`claim_destination`] before writing anything (it must not exist yet);
/// - never leave a partially written file behind: an entry either lands complete or is removed;
/// - on an entry failure, return an error unless `opts.continue_on_error` is set.
///
/// The caller purges `dest` when `unpack` fails, so an implementation may bail at any point.
pub trait Extractor: Send + Sync {
    /// Short format name for logs.
    fn name(&self) -> &'static str;

    /// Whether the extractor can run at all (e.g. its external tool is installed).
    /// Checked before the destination is claimed; a failure defers the archive.
    fn available(&self) -> Result<(), ExtractionError> {
        Ok(())
    }

    fn unpack(
        &self,
        archive: &Path,
        dest: &Path,
        opts: &UnpackOpts,
    ) -> Result<UnpackReport, ExtractionError>;
}

/// Capability table: archive extension (lowercase, with dot, may be compound) → extractor.
#[derive(Clone, Default)]
pub struct ExtractorTable {
    by_ext: HashMap<String, Arc<dyn Extractor>>,
}

impl ExtractorTable {
    /// Table with no formats; every file is then a leaf.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `.rar`, `.zip`, `.tar`, `.tar.gz`/`.tgz`, and `.7z` (external tool).
    pub fn with_defaults() -> Self {
        let mut table = Self::empty();
        let tar_gz: Arc<dyn Extractor> = Arc::new(TarExtractor::gzip());
        table
            .register(".rar", Arc::new(RarExtractor))
            .register(".zip", Arc::new(ZipExtractor))
            .register(".tar", Arc::new(TarExtractor::plain()))
            .register(".tar.gz", Arc::clone(&tar_gz))
            .register(".tgz", tar_gz)
            .register(".7z", Arc::new(SevenZipExtractor::default()));
        table
    }

    /// Register (or replace) the extractor for `ext`. `"ZIP"` and `".zip"` are the same key.
    pub fn register(&mut self, ext: &str, extractor: Arc<dyn Extractor>) -> &mut Self {
        self.by_ext.insert(normalize_ext(ext), extractor);
        self
    }

    pub fn get(&self, ext: &str) -> Option<&Arc<dyn Extractor>> {
        self.by_ext.get(ext)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.by_ext.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_ext.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ext.is_empty()
    }
}

impl std::fmt::Debug for ExtractorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut exts: Vec<_> = self
            .by_ext
            .iter()
            .map(|(ext, x)| (ext.as_str(), x.name()))
            .collect();
        exts.sort();
        f.debug_struct("ExtractorTable").field("formats", &exts).finish()
    }
}
