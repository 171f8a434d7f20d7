//! Application configuration constants.
//! Defaults and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Optional per-base-directory config file (e.g. `.unnest.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Output layout ----

/// Default directory names of the output layout, relative to the base directory.
pub struct LayoutDefaults;

impl LayoutDefaults {
    /// Extraction destinations, one `<hash>/` per archive.
    pub const UNPACK: &'static str = "unrar";
    /// Successfully handled archives, `<hash><ext>`.
    pub const DONE: &'static str = "rar";
    /// Archives that failed to extract, `<hash><ext>`.
    pub const ERROR: &'static str = "rar_error";
    /// Document-like files, sharded by the first two hex chars of the hash.
    pub const DOCUMENT: &'static str = "doc";
    /// Spreadsheets.
    pub const SPREADSHEET: &'static str = "list";
    /// Everything else.
    pub const OTHER: &'static str = "other";
}

/// Default working directory (relative to base) when none is configured.
pub const DEFAULT_WORK_DIR: &str = "worker";

/// Number of hash hex characters used as the document shard directory.
pub const SHARD_LEN: usize = 2;

// ---- Classification ----

/// Extensions (lowercase, with dot) routed to the document store.
pub const DEFAULT_DOCUMENT_EXTS: &[&str] = &[
    ".doc", ".docx", ".htm", ".html", ".txt", ".mht", ".eml", ".pdf",
];

/// Extensions (lowercase, with dot) routed to the spreadsheet store.
pub const DEFAULT_SPREADSHEET_EXTS: &[&str] = &[".xls", ".xlsx"];

/// File-name globs marking downloads that are still in progress. Matching files are left alone.
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &["*downloading", "*downloading.cfg", "*download"];

// ---- Hashing ----

/// Hashing I/O buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// Chunk size for streaming a file through the hasher (bytes). 1 MB.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
}

// ---- External tools ----

/// Candidate binary names for the 7z command line tool, tried in order.
pub const SEVENZIP_BINARIES: &[&str] = &["7z", "7za", "7zz"];
