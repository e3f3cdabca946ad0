//! Active watch list construction
//!
//! The active list is the runtime view of the config: per destination,
//! the watched files that survive ignore filtering, each paired with
//! its last-seen modification time. It is built once per watch session
//! and never re-filtered during a run; ignore edits take effect on the
//! next session.

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use wac_core::Config;

/// One file under observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEntry {
    /// Source path, relative to the directory the watch originated
    /// from (mirrored verbatim under the destination on copy).
    pub source: PathBuf,

    /// Modification time recorded by the previous scan. `None` until
    /// the first scan baselines the entry, which never triggers a
    /// copy.
    pub last_seen: Option<SystemTime>,
}

impl WatchEntry {
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            last_seen: None,
        }
    }
}

/// The entries watched for a single destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveGroup {
    pub dest: PathBuf,
    pub entries: Vec<WatchEntry>,
}

/// Ignore-filtered view of every watch group, in destination order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveWatchList {
    pub groups: Vec<ActiveGroup>,
}

impl ActiveWatchList {
    /// Total number of entries across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the active watch list for a session.
///
/// Pure transform: no I/O, `config` is not mutated. Sources on the
/// ignore list are dropped; a group whose entries are all ignored is
/// retained with no entries. Group order follows the config's
/// destination order and entry order follows the stored list, so one
/// run scans in a stable order.
pub fn build_active_list(config: &Config) -> ActiveWatchList {
    let groups = config
        .watch
        .iter()
        .map(|(dest, sources)| ActiveGroup {
            dest: dest.clone(),
            entries: sources
                .iter()
                .filter(|source| !config.is_ignored(source))
                .map(|source| WatchEntry::new(source.clone()))
                .collect(),
        })
        .collect();

    ActiveWatchList { groups }
}

/// Build an active list for a single ad-hoc group, bypassing any
/// config. Used for pattern-driven sessions that are not persisted.
pub fn single_group(sources: Vec<PathBuf>, dest: &Path) -> ActiveWatchList {
    ActiveWatchList {
        groups: vec![ActiveGroup {
            dest: dest.to_path_buf(),
            entries: sources.into_iter().map(WatchEntry::new).collect(),
        }],
    }
}
