//! Path normalization for stored watch paths
//!
//! Membership tests on the watch and ignore lists are exact path
//! equality, so every path entering the config is first reduced to a
//! canonical spelling: `./src/x.txt` and `src/x.txt` must compare
//! equal.

use std::path::{Component, Path, PathBuf};

/// Normalize a path for storage and comparison.
///
/// Rebuilds the path from its components, dropping `.` segments. Does
/// not touch the filesystem: `..` segments and symlinks are kept
/// as-is, since stored paths are compared textually, not resolved.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Normalize a whole list of paths, preserving order.
pub fn normalize_all<I, P>(paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths.into_iter().map(|p| normalize(p.as_ref())).collect()
}
