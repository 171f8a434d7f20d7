//! Extension-based classification into archive / document / spreadsheet / other.

use std::collections::HashSet;
use std::path::Path;

use crate::engine::tools::lower_file_name;
use crate::{Branch, Category, Classified};

/// Maps a file name's extension (case-insensitive) to a [`Branch`].
///
/// Archive extensions may be compound (`.tar.gz`); they are tried longest first so a compound
/// suffix wins over its last component. Anything unrecognised is [`Category::Other`].
#[derive(Clone, Debug)]
pub struct Classifier {
    /// Lowercase, dot-prefixed, sorted by length descending.
    archive_exts: Vec<String>,
    document_exts: HashSet<String>,
    spreadsheet_exts: HashSet<String>,
}

impl Classifier {
    pub fn new<A, D, S>(archive_exts: A, document_exts: D, spreadsheet_exts: S) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let mut archive_exts: Vec<String> = archive_exts
            .into_iter()
            .map(|e| normalize_ext(e.as_ref()))
            .collect();
        archive_exts.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        archive_exts.dedup();
        Classifier {
            archive_exts,
            document_exts: document_exts
                .into_iter()
                .map(|e| normalize_ext(e.as_ref()))
                .collect(),
            spreadsheet_exts: spreadsheet_exts
                .into_iter()
                .map(|e| normalize_ext(e.as_ref()))
                .collect(),
        }
    }

    pub fn classify(&self, path: &Path) -> Classified {
        let name = match lower_file_name(path) {
            Some(n) => n,
            None => {
                return Classified {
                    branch: Branch::Leaf(Category::Other),
                    ext: String::new(),
                };
            }
        };

        // A bare ".zip" is a hidden file with no extension, not a zip.
        if let Some(ext) = self
            .archive_exts
            .iter()
            .find(|ext| name.len() > ext.len() && name.ends_with(ext.as_str()))
        {
            return Classified {
                branch: Branch::Archive,
                ext: ext.clone(),
            };
        }

        let ext = single_ext(&name);
        let category = if self.document_exts.contains(&ext) {
            Category::Document
        } else if self.spreadsheet_exts.contains(&ext) {
            Category::Spreadsheet
        } else {
            Category::Other
        };
        Classified {
            branch: Branch::Leaf(category),
            ext,
        }
    }
}

/// Lowercase and ensure a leading dot (`"ZIP"` → `".zip"`).
pub fn normalize_ext(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

/// Last `.suffix` of a lowercased file name, with the dot; empty when there is none.
fn single_ext(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}
