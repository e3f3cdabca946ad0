//! Pattern-based discovery of files to watch
//!
//! Expands `--name` patterns against a source directory into the
//! concrete file list handed to the config or the watch session.
//! Discovery applies a default-ignore filter so broad patterns do not
//! pick up `.git` internals, files already sitting in the destination
//! directory, or the config file itself.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use wac_core::{paths, DEFAULT_CONFIG_FILE};
use walkdir::WalkDir;

/// Find files under `source_dir` whose name matches any of `patterns`.
///
/// Non-recursive mode looks at direct children only; recursive mode
/// walks the whole tree. Returned paths keep the `source_dir` prefix,
/// normalized, so the copy step mirrors the structure under the
/// destination.
pub fn discover(
    source_dir: &Path,
    dest_dir: &Path,
    patterns: &[String],
    recursive: bool,
) -> Result<Vec<PathBuf>> {
    let mut hits = Vec::new();

    if recursive {
        let walk = WalkDir::new(source_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git");

        for entry in walk {
            let entry = entry.with_context(|| {
                format!("failed to walk source directory {}", source_dir.display())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if patterns.iter().any(|p| matches_pattern(&name, p)) {
                hits.push(entry.path().to_path_buf());
            }
        }
    } else {
        let entries = fs::read_dir(source_dir).with_context(|| {
            format!("failed to read source directory {}", source_dir.display())
        })?;

        for entry in entries {
            let entry = entry.with_context(|| {
                format!("failed to read source directory {}", source_dir.display())
            })?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if patterns.iter().any(|p| matches_pattern(&name, p)) {
                hits.push(source_dir.join(entry.file_name()));
            }
        }
    }

    let dest_dir = paths::normalize(dest_dir);
    let mut files: Vec<PathBuf> = hits
        .into_iter()
        .map(|p| paths::normalize(&p))
        .filter(|p| !is_default_ignored(p, &dest_dir))
        .collect();
    files.sort();

    Ok(files)
}

/// Filter applied to every discovery hit regardless of pattern.
fn is_default_ignored(path: &Path, dest_dir: &Path) -> bool {
    // Anything inside a git repository's metadata.
    if path.components().any(|c| c.as_os_str() == ".git") {
        return true;
    }

    // Files directly in the destination: keeps a recursive watch from
    // picking up its own output.
    if path.parent() == Some(dest_dir) {
        return true;
    }

    // The config file itself.
    if path.file_name().is_some_and(|n| n == DEFAULT_CONFIG_FILE) {
        return true;
    }

    false
}

/// Match a file name against a `*`-wildcard pattern. `*` matches any
/// run of characters within the name; a pattern without `*` must match
/// exactly.
fn matches_pattern(name: &str, pattern: &str) -> bool {
    if !pattern.contains('*') {
        return name == pattern;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    // A pattern containing '*' always splits into two or more parts.
    let Some((first, rest_parts)) = parts.split_first() else {
        return false;
    };
    let Some((last, middle)) = rest_parts.split_last() else {
        return false;
    };

    let Some(mut rest) = name.strip_prefix(first) else {
        return false;
    };

    for part in middle {
        if part.is_empty() {
            continue;
        }
        match rest.find(part) {
            Some(at) => rest = &rest[at + part.len()..],
            None => return false,
        }
    }

    rest.ends_with(last)
}
