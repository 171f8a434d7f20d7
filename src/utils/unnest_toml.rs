//! Load `.unnest.toml` from the base directory (CLI only). Lib callers build [`Opts`] themselves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::engine::classify::normalize_ext;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct UnnestToml {
    #[serde(default)]
    settings: SettingsSection,
    #[serde(default)]
    layout: LayoutSection,
    #[serde(default)]
    categories: CategoriesSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    work_dir: Option<String>,
    jobs: Option<usize>,
    continue_on_error: Option<bool>,
    skip_patterns: Option<Vec<String>>,
    verbose: Option<bool>,
    progress: Option<bool>,
    json: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LayoutSection {
    unpack: Option<String>,
    done: Option<String>,
    error: Option<String>,
    document: Option<String>,
    spreadsheet: Option<String>,
    other: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CategoriesSection {
    documents: Option<Vec<String>>,
    spreadsheets: Option<Vec<String>>,
}

impl UnnestToml {
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).context("parse config")
    }
}

/// Load the config file from `dir`. `Ok(None)` if there is none; `Err` if it exists but is unreadable or invalid.
pub fn load_config(dir: &Path) -> Result<Option<UnnestToml>> {
    let path = dir.join(PackagePaths::get().config_filename());
    if !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    UnnestToml::parse(&s)
        .with_context(|| path.display().to_string())
        .map(Some)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub fn apply_config(file: &UnnestToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref p) = s.work_dir {
        opts.work_dir = PathBuf::from(p);
    }
    if s.jobs.is_some() {
        opts.jobs = s.jobs;
    }
    apply_file_opt!(s, opts, continue_on_error => continue_on_error);
    apply_file_opt!(s, opts, skip_patterns => skip_patterns);
    apply_file_opt!(s, opts, verbose => verbose);
    apply_file_opt!(s, opts, progress => progress);
    apply_file_opt!(s, opts, json => json);

    let l = &file.layout;
    let names = &mut opts.layout;
    apply_file_opt!(l, names, unpack => unpack);
    apply_file_opt!(l, names, done => done);
    apply_file_opt!(l, names, error => error);
    apply_file_opt!(l, names, document => document);
    apply_file_opt!(l, names, spreadsheet => spreadsheet);
    apply_file_opt!(l, names, other => other);

    let c = &file.categories;
    if let Some(ref v) = c.documents {
        opts.document_exts = v.iter().map(|e| normalize_ext(e)).collect();
    }
    if let Some(ref v) = c.spreadsheets {
        opts.spreadsheet_exts = v.iter().map(|e| normalize_ext(e)).collect();
    }
}
