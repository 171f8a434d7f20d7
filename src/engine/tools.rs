//! Path and filter utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Path for log lines: relative to `base` when under it, otherwise as given.
pub fn display_path(path: &Path, base: &Path) -> String {
    path_relative_to(path, base)
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

/// Lowercased file name, or None for paths without a UTF-8 final component.
pub fn lower_file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_lowercase())
}

/// True if the file name matches any of the patterns (partial-download sentinels and the like).
pub fn matches_any_pattern(path: &Path, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    patterns.iter().any(|pattern| glob_match(pattern, name))
}

/// Simple glob pattern matching (supports * and ?)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    // Remove leading '!' if present (negation handled by caller)
    let pattern = pattern.strip_prefix('!').unwrap_or(pattern);

    let mut pattern_chars = pattern.chars().peekable();
    let mut text_chars = text.chars().peekable();

    while let Some(&p) = pattern_chars.peek() {
        match p {
            '*' => {
                pattern_chars.next();
                if pattern_chars.peek().is_none() {
                    return true; // trailing * matches everything
                }
                let rest: String = pattern_chars.clone().collect();
                loop {
                    if glob_match(&rest, &text_chars.clone().collect::<String>()) {
                        return true;
                    }
                    if text_chars.next().is_none() {
                        return false;
                    }
                }
            }
            '?' => {
                pattern_chars.next();
                if text_chars.next().is_none() {
                    return false;
                }
            }
            _ => {
                pattern_chars.next();
                if text_chars.next() != Some(p) {
                    return false;
                }
            }
        }
    }

    text_chars.peek().is_none()
}

/// Canonicalize an existing directory, failing with context if it is missing or not a directory.
pub fn check_dir_and_canonicalize(path: &Path, what: &str) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("{} does not exist: {}", what, path.display()))?;
    if !canonical.is_dir() {
        anyhow::bail!("{} is not a directory: {}", what, canonical.display());
    }
    Ok(canonical)
}
