//! In-memory watch configuration
//!
//! A [`Config`] groups watched source files by the destination
//! directory they are copied to, plus a flat ignore list. Files on the
//! ignore list are never watched even when a watch group contains
//! them, which lets broad patterns coexist with narrow exclusions.
//!
//! All mutation is in-memory; callers persist explicitly through
//! [`crate::store::save`].

use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Watched files grouped by destination, plus the ignore list.
///
/// Destinations map to the ordered list of source files copied there.
/// `BTreeMap` keeps destination iteration deterministic; within a
/// group, insertion order is preserved and entries are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Destination directory -> watched source files.
    #[serde(default)]
    pub watch: BTreeMap<PathBuf, Vec<PathBuf>>,

    /// Files excluded from watching regardless of group membership.
    #[serde(default)]
    pub ignore: Vec<PathBuf>,
}

impl Config {
    /// Add files to the watch group for `dest`, creating the group if
    /// it does not exist. Files already present in the group are
    /// skipped.
    pub fn add_watch_files<I, P>(&mut self, files: I, dest: &Path)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let group = self
            .watch
            .entry(paths::normalize(dest))
            .or_default();

        for file in files {
            let file = paths::normalize(file.as_ref());
            if !group.contains(&file) {
                group.push(file);
            }
        }
    }

    /// Remove files from the watch group for `dest`. Files not in the
    /// group, and a `dest` with no group, are silently ignored.
    pub fn remove_watch_files<I, P>(&mut self, files: I, dest: &Path)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let Some(group) = self.watch.get_mut(&paths::normalize(dest)) else {
            return;
        };

        let removed = paths::normalize_all(files);
        group.retain(|entry| !removed.contains(entry));
    }

    /// Add files to the ignore list, skipping ones already present.
    pub fn add_ignore_files<I, P>(&mut self, files: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for file in files {
            let file = paths::normalize(file.as_ref());
            if !self.ignore.contains(&file) {
                self.ignore.push(file);
            }
        }
    }

    /// Remove files from the ignore list. Absent files are silently
    /// ignored.
    pub fn remove_ignore_files<I, P>(&mut self, files: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let removed = paths::normalize_all(files);
        self.ignore.retain(|entry| !removed.contains(entry));
    }

    /// Check whether a file is on the ignore list (exact normalized
    /// path equality).
    pub fn is_ignored(&self, file: &Path) -> bool {
        self.ignore.contains(&paths::normalize(file))
    }
}
